//! The authenticated user's profile.
//!
//! A profile is only ever populated from a successful identity check
//! against the remote service; it is never persisted locally and is
//! re-derived from the credential after every process restart.

use lantern_core::UserId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Profile of the authenticated user, as returned by the identity endpoint.
///
/// The remote API attaches additional domain fields (avatar, biography,
/// timestamps, ...) that this core carries along opaquely in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// The server-assigned user identifier.
    user_id: UserId,
    /// The user's display name.
    username: String,
    /// Access level as a non-negative integer.
    role: u32,
    /// Remaining domain fields, passed through untouched.
    #[serde(flatten)]
    extra: Map<String, JsonValue>,
}

impl UserProfile {
    /// Creates a profile with no extra domain fields.
    #[must_use]
    pub fn new(user_id: UserId, username: impl Into<String>, role: u32) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
            extra: Map::new(),
        }
    }

    /// Returns the user's identifier.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the user's display name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the user's access level.
    #[must_use]
    pub fn role(&self) -> u32 {
        self.role
    }

    /// Returns the pass-through domain fields.
    #[must_use]
    pub fn extra(&self) -> &Map<String, JsonValue> {
        &self.extra
    }
}
