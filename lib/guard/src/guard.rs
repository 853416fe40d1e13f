//! The route guard: gates rendering of a protected view behind a valid,
//! sufficiently-privileged session.
//!
//! One guard instance decorates one protected view. Its check runs on
//! mount and again on every navigation event, since a session can die
//! between navigations; the outcome is never trusted indefinitely.
//! While a check is pending the guard presents a distinct
//! "authenticating" placeholder; the protected view is never shown
//! before the check completes.

use crate::navigator::Navigator;
use crate::range::RoleRange;
use lantern_session::SessionStore;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// What the guard currently presents in place of the protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardView {
    /// A gating check is pending; show the placeholder.
    Authenticating,
    /// The check passed; render the protected view.
    Content,
    /// The check failed; a redirect was handed to the navigator.
    Redirected,
}

/// Outcome of one gating check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Session valid and role admitted; the view may render.
    Granted,
    /// No session; the user was sent to the login path.
    RedirectedToLogin,
    /// Valid session, role outside the range; sent to the fallback
    /// path. Deliberately silent: no user-visible error.
    RedirectedToFallback,
    /// A newer navigation superseded this check; its result was
    /// discarded without touching the view or the navigator.
    Superseded,
}

/// Gates one protected view behind a role range.
pub struct RouteGuard {
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    range: RoleRange,
    login_path: String,
    /// Monotonic navigation generation; only the check holding the
    /// latest generation may apply its outcome (last-navigation-wins).
    generation: AtomicU64,
    view: Mutex<GuardView>,
}

impl RouteGuard {
    /// Creates a guard admitting any authenticated user, redirecting to
    /// `/login` when there is no session.
    #[must_use]
    pub fn new(store: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            range: RoleRange::default(),
            login_path: "/login".to_string(),
            generation: AtomicU64::new(0),
            view: Mutex::new(GuardView::Authenticating),
        }
    }

    /// Sets the role range for this view.
    #[must_use]
    pub fn with_range(mut self, range: RoleRange) -> Self {
        self.range = range;
        self
    }

    /// Sets the no-session redirect destination.
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Returns the configured role range.
    #[must_use]
    pub fn range(&self) -> &RoleRange {
        &self.range
    }

    /// Returns what the guard currently presents.
    #[must_use]
    pub fn view(&self) -> GuardView {
        *self.view.lock().unwrap()
    }

    /// Runs the gating check for a mount or navigation event.
    ///
    /// Awaits session restoration first: no view renders before
    /// `initialize` has completed. A cached profile short-circuits
    /// revalidation; otherwise the (process-wide coalesced) identity
    /// check runs. Starting another check on this guard while one is in
    /// flight supersedes the older one: the stale outcome is discarded
    /// at resolution time instead of overwriting the newer navigation's.
    pub async fn check(&self) -> CheckOutcome {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.set_view(GuardView::Authenticating);

        self.store.ready().await;
        if self.superseded(generation) {
            return CheckOutcome::Superseded;
        }

        let profile = match self.store.profile() {
            Some(profile) => Some(profile),
            None => self.store.revalidate().await,
        };
        if self.superseded(generation) {
            debug!("gating check superseded by a newer navigation");
            return CheckOutcome::Superseded;
        }

        match profile {
            None => {
                debug!(login_path = %self.login_path, "no session, redirecting to login");
                self.navigator.redirect(&self.login_path);
                self.set_view(GuardView::Redirected);
                CheckOutcome::RedirectedToLogin
            }
            Some(profile) if self.range.admits(profile.role()) => {
                self.set_view(GuardView::Content);
                CheckOutcome::Granted
            }
            Some(profile) => {
                debug!(
                    role = profile.role(),
                    min = self.range.min(),
                    max = self.range.max(),
                    "role outside range, redirecting to fallback"
                );
                self.navigator.redirect(self.range.fallback_path());
                self.set_view(GuardView::Redirected);
                CheckOutcome::RedirectedToFallback
            }
        }
    }

    fn superseded(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) != generation
    }

    fn set_view(&self, view: GuardView) {
        *self.view.lock().unwrap() = view;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lantern_session::{
        ApiRequest, ApiResponse, ApiTransport, MemoryCredentialStorage, SessionConfig,
        SessionStore, StatusCode, TransportError,
    };
    use serde_json::json;
    use std::collections::VecDeque;
    use tokio::sync::Notify;

    /// Navigator fake recording every redirect destination.
    #[derive(Default)]
    struct RecordingNavigator {
        redirects: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        fn redirects(&self) -> Vec<String> {
            self.redirects.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn redirect(&self, path: &str) {
            self.redirects.lock().unwrap().push(path.to_string());
        }
    }

    /// Identity endpoint fake replaying scripted responses.
    struct ScriptedIdentity {
        replies: Mutex<VecDeque<ApiResponse>>,
        calls: Mutex<usize>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedIdentity {
        fn new() -> Self {
            Self {
                replies: Mutex::new(VecDeque::new()),
                calls: Mutex::new(0),
                gate: None,
            }
        }

        fn gated(gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new()
            }
        }

        fn push_profile(&self, user_id: &str, role: u32) {
            let body = json!({ "userId": user_id, "username": "alice", "role": role });
            self.replies
                .lock()
                .unwrap()
                .push_back(ApiResponse::new(StatusCode::OK, body.to_string()));
        }

        fn push_status(&self, status: StatusCode) {
            self.replies
                .lock()
                .unwrap()
                .push_back(ApiResponse::new(status, Vec::new()));
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ApiTransport for ScriptedIdentity {
        async fn execute(&self, _request: ApiRequest) -> Result<ApiResponse, TransportError> {
            *self.calls.lock().unwrap() += 1;

            match &self.gate {
                Some(gate) => gate.notified().await,
                None => tokio::task::yield_now().await,
            }

            match self.replies.lock().unwrap().pop_front() {
                Some(response) => Ok(response),
                None => Err(TransportError::Request {
                    details: "no scripted reply".to_string(),
                }),
            }
        }
    }

    fn session(
        persisted: Option<&str>,
        transport: Arc<ScriptedIdentity>,
    ) -> Arc<SessionStore> {
        let storage = match persisted {
            Some(credential) => Arc::new(MemoryCredentialStorage::with_value(credential)),
            None => Arc::new(MemoryCredentialStorage::new()),
        };
        Arc::new(SessionStore::new(
            SessionConfig::new("https://api.example.com"),
            storage,
            transport,
        ))
    }

    #[tokio::test]
    async fn no_persisted_credential_redirects_to_login() {
        // Scenario A: fresh start, default range, no credential.
        let transport = Arc::new(ScriptedIdentity::new());
        let store = session(None, transport.clone());
        store.initialize();

        let navigator = Arc::new(RecordingNavigator::default());
        let guard = RouteGuard::new(store, navigator.clone());

        assert_eq!(guard.view(), GuardView::Authenticating);
        assert_eq!(guard.check().await, CheckOutcome::RedirectedToLogin);
        assert_eq!(guard.view(), GuardView::Redirected);
        assert_eq!(navigator.redirects(), vec!["/login".to_string()]);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn valid_credential_with_admitted_role_renders_content() {
        // Scenario B: persisted credential, identity returns role 10,
        // range 10..100, minimum inclusive.
        let transport = Arc::new(ScriptedIdentity::new());
        transport.push_profile("u1", 10);
        let store = session(Some("tok"), transport.clone());
        store.initialize();

        let navigator = Arc::new(RecordingNavigator::default());
        let guard = RouteGuard::new(store.clone(), navigator.clone())
            .with_range(RoleRange::new(10, 100, "/"));

        assert_eq!(guard.check().await, CheckOutcome::Granted);
        assert_eq!(guard.view(), GuardView::Content);
        assert!(navigator.redirects().is_empty());
        // Profile cached for subsequent checks.
        assert!(store.profile().is_some());
    }

    #[tokio::test]
    async fn insufficient_role_redirects_to_fallback_silently() {
        // Scenario C: valid session, role 10, range 20..100.
        let transport = Arc::new(ScriptedIdentity::new());
        transport.push_profile("u1", 10);
        let store = session(Some("tok"), transport.clone());
        store.initialize();

        let navigator = Arc::new(RecordingNavigator::default());
        let guard = RouteGuard::new(store.clone(), navigator.clone())
            .with_range(RoleRange::new(20, 100, "/overview"));

        assert_eq!(guard.check().await, CheckOutcome::RedirectedToFallback);
        assert_eq!(guard.view(), GuardView::Redirected);
        assert_eq!(navigator.redirects(), vec!["/overview".to_string()]);
        // The session itself is untouched: the role verdict is per-view.
        assert!(store.profile().is_some());
    }

    #[tokio::test]
    async fn role_at_exclusive_maximum_is_rejected() {
        let transport = Arc::new(ScriptedIdentity::new());
        transport.push_profile("u1", 100);
        let store = session(Some("tok"), transport.clone());
        store.initialize();

        let navigator = Arc::new(RecordingNavigator::default());
        let guard = RouteGuard::new(store, navigator.clone());

        assert_eq!(guard.check().await, CheckOutcome::RedirectedToFallback);
        assert_eq!(navigator.redirects(), vec!["/".to_string()]);
    }

    #[tokio::test]
    async fn cached_profile_skips_revalidation_on_next_navigation() {
        let transport = Arc::new(ScriptedIdentity::new());
        transport.push_profile("u1", 10);
        let store = session(Some("tok"), transport.clone());
        store.initialize();

        let navigator = Arc::new(RecordingNavigator::default());
        let guard = RouteGuard::new(store, navigator);

        assert_eq!(guard.check().await, CheckOutcome::Granted);
        assert_eq!(guard.check().await, CheckOutcome::Granted);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn dead_session_is_not_reused_on_later_navigation() {
        // Scenario D: authenticated, then an unrelated request sees 401.
        let transport = Arc::new(ScriptedIdentity::new());
        transport.push_profile("u1", 10);
        let store = session(Some("tok"), transport.clone());
        store.initialize();

        let navigator = Arc::new(RecordingNavigator::default());
        let guard = RouteGuard::new(store.clone(), navigator.clone());
        assert_eq!(guard.check().await, CheckOutcome::Granted);

        store.notify_unauthorized();

        // The stale cached profile must not grant access again.
        assert_eq!(guard.check().await, CheckOutcome::RedirectedToLogin);
        assert_eq!(guard.view(), GuardView::Redirected);
        assert_eq!(navigator.redirects(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn empty_range_always_redirects() {
        let transport = Arc::new(ScriptedIdentity::new());
        transport.push_profile("u1", 50);
        let store = session(Some("tok"), transport.clone());
        store.initialize();

        let navigator = Arc::new(RecordingNavigator::default());
        let guard = RouteGuard::new(store, navigator.clone())
            .with_range(RoleRange::new(60, 40, "/nowhere"));

        assert_eq!(guard.check().await, CheckOutcome::RedirectedToFallback);
        assert_eq!(navigator.redirects(), vec!["/nowhere".to_string()]);
    }

    #[tokio::test]
    async fn check_waits_for_session_restoration() {
        let transport = Arc::new(ScriptedIdentity::new());
        let store = session(None, transport.clone());
        // Deliberately not initialized yet.

        let navigator = Arc::new(RecordingNavigator::default());
        let guard = RouteGuard::new(store.clone(), navigator.clone());

        let (outcome, ()) = tokio::join!(guard.check(), async {
            tokio::task::yield_now().await;
            assert_eq!(guard.view(), GuardView::Authenticating);
            store.initialize();
        });

        assert_eq!(outcome, CheckOutcome::RedirectedToLogin);
        assert_eq!(navigator.redirects(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn newer_navigation_supersedes_an_in_flight_check() {
        let gate = Arc::new(Notify::new());
        let transport = Arc::new(ScriptedIdentity::gated(gate.clone()));
        transport.push_profile("u1", 10);
        let store = session(Some("tok"), transport.clone());
        store.initialize();

        let navigator = Arc::new(RecordingNavigator::default());
        let guard = RouteGuard::new(store, navigator.clone());

        let (first, second, ()) = tokio::join!(
            guard.check(),
            async {
                tokio::task::yield_now().await;
                guard.check().await
            },
            async {
                for _ in 0..4 {
                    tokio::task::yield_now().await;
                }
                gate.notify_one();
            }
        );

        // The first check resolved after the second began: its outcome
        // is discarded, the second one's is applied.
        assert_eq!(first, CheckOutcome::Superseded);
        assert_eq!(second, CheckOutcome::Granted);
        assert_eq!(guard.view(), GuardView::Content);
        assert!(navigator.redirects().is_empty());
        // Coalescing held as well: one identity request served both.
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn transient_failure_redirects_to_login_without_clearing() {
        let transport = Arc::new(ScriptedIdentity::new());
        transport.push_status(StatusCode::BAD_GATEWAY);
        let store = session(Some("tok"), transport.clone());
        store.initialize();

        let navigator = Arc::new(RecordingNavigator::default());
        let guard = RouteGuard::new(store.clone(), navigator.clone());

        assert_eq!(guard.check().await, CheckOutcome::RedirectedToLogin);
        // The candidate credential survives a transient failure.
        assert!(store.credential().is_some());
    }
}
