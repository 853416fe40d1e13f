//! In-memory session state and its lifecycle phases.
//!
//! `SessionState` is owned exclusively by the [`SessionStore`]; nothing
//! else writes it. The state upholds one invariant: a profile is present
//! only while a credential is present. The converse does not hold: a
//! restored credential sits unverified (no profile) until revalidated.
//!
//! [`SessionStore`]: crate::store::SessionStore

use crate::credential::Credential;
use crate::profile::UserProfile;

/// The session tuple: credential, derived profile, restoration flag.
#[derive(Debug, Clone)]
pub struct SessionState {
    credential: Option<Credential>,
    profile: Option<UserProfile>,
    initializing: bool,
}

impl SessionState {
    /// Creates the pre-restoration state.
    ///
    /// `initializing` starts true and goes false exactly once, when the
    /// startup restoration window closes. It never becomes true again.
    #[must_use]
    pub fn new() -> Self {
        Self {
            credential: None,
            profile: None,
            initializing: true,
        }
    }

    /// Returns the current credential, if any.
    #[must_use]
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Returns the cached profile, if any.
    #[must_use]
    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Returns true only during the startup restoration window.
    #[must_use]
    pub fn is_initializing(&self) -> bool {
        self.initializing
    }

    /// Closes the restoration window, installing the restored credential.
    ///
    /// The restored credential is a candidate only: no profile is attached
    /// until an identity check confirms it.
    pub(crate) fn finish_restore(&mut self, credential: Option<Credential>) {
        self.credential = credential;
        self.initializing = false;
    }

    /// Replaces the credential, dropping any profile derived from the old one.
    pub(crate) fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
        self.profile = None;
    }

    /// Nulls both credential and profile.
    pub(crate) fn clear(&mut self) {
        self.credential = None;
        self.profile = None;
    }

    /// Caches a freshly revalidated profile.
    ///
    /// Ignored when no credential is held, upholding the invariant; the
    /// store only calls this for the credential the check ran under.
    pub(crate) fn store_profile(&mut self, profile: UserProfile) {
        if self.credential.is_some() {
            self.profile = Some(profile);
        }
    }

    /// Returns the lifecycle phase this state is in.
    ///
    /// `Authenticating` is not derivable from the tuple alone; the store
    /// layers it on top while an identity check is in flight.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.initializing {
            SessionPhase::Restoring
        } else if self.profile.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::NoSession
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle phases of the session.
///
/// The machine cycles between `NoSession` and `Authenticated` for the
/// life of the process; there is no terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Startup restoration window; no gating check may run yet.
    Restoring,
    /// No confirmed session. A restored-but-unverified credential is
    /// still `NoSession`: a candidate, not an authenticated user.
    NoSession,
    /// An identity check is in flight.
    Authenticating,
    /// The credential was confirmed and a profile is cached.
    Authenticated,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_core::UserId;

    #[test]
    fn starts_restoring() {
        let state = SessionState::new();
        assert!(state.is_initializing());
        assert_eq!(state.phase(), SessionPhase::Restoring);
        assert!(state.credential().is_none());
        assert!(state.profile().is_none());
    }

    #[test]
    fn restored_credential_is_not_authenticated() {
        let mut state = SessionState::new();
        state.finish_restore(Some(Credential::new("tok")));
        assert!(!state.is_initializing());
        assert_eq!(state.phase(), SessionPhase::NoSession);
        assert!(state.credential().is_some());
        assert!(state.profile().is_none());
    }

    #[test]
    fn profile_requires_credential() {
        let mut state = SessionState::new();
        state.finish_restore(None);
        state.store_profile(UserProfile::new(UserId::new("u1"), "alice", 10));
        assert!(state.profile().is_none());

        state.set_credential(Credential::new("tok"));
        state.store_profile(UserProfile::new(UserId::new("u1"), "alice", 10));
        assert!(state.profile().is_some());
        assert_eq!(state.phase(), SessionPhase::Authenticated);
    }

    #[test]
    fn replacing_credential_drops_stale_profile() {
        let mut state = SessionState::new();
        state.finish_restore(Some(Credential::new("old")));
        state.store_profile(UserProfile::new(UserId::new("u1"), "alice", 10));

        state.set_credential(Credential::new("new"));
        assert!(state.profile().is_none());
        assert_eq!(state.credential().map(Credential::as_str), Some("new"));
    }

    #[test]
    fn clear_nulls_both_fields() {
        let mut state = SessionState::new();
        state.finish_restore(Some(Credential::new("tok")));
        state.store_profile(UserProfile::new(UserId::new("u1"), "alice", 10));

        state.clear();
        assert!(state.credential().is_none());
        assert!(state.profile().is_none());
        assert_eq!(state.phase(), SessionPhase::NoSession);
    }
}
