//! The bearer credential proving identity to the remote API.
//!
//! The credential is opaque to this client: it is received from the
//! sign-in endpoint, persisted verbatim, and attached verbatim to
//! outbound requests. No expiry or structure is interpreted client-side.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Creates a credential from a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Credential {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Credential {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Formats the `Authorization` header value for an optional credential.
///
/// An absent credential yields the literal `Bearer null`. Requests carrying
/// it are certain to be rejected by the remote service; they are sent
/// anyway rather than short-circuited locally, so the server remains the
/// single authority on what a valid credential is.
#[must_use]
pub fn authorization_header_value(credential: Option<&Credential>) -> String {
    match credential {
        Some(credential) => format!("Bearer {}", credential.as_str()),
        None => "Bearer null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_round_trips_raw_token() {
        let credential = Credential::new("tok_123");
        assert_eq!(credential.as_str(), "tok_123");
        assert_eq!(credential.to_string(), "tok_123");
    }

    #[test]
    fn header_value_with_credential() {
        let credential = Credential::new("abc");
        assert_eq!(
            authorization_header_value(Some(&credential)),
            "Bearer abc"
        );
    }

    #[test]
    fn header_value_without_credential_is_literal_null() {
        assert_eq!(authorization_header_value(None), "Bearer null");
    }
}
