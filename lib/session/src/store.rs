//! The session store: single source of truth for "who is logged in and
//! with what credential".
//!
//! The store is constructed explicitly and shared via `Arc`; there is
//! no ambient global. It is the only writer of [`SessionState`], and the
//! only code path allowed to attach the credential to outbound requests.
//!
//! # Lifecycle
//!
//! `initialize` runs once at process start and restores any persisted
//! credential without verifying it (lazy revalidation). From then on the
//! session cycles between no-session and authenticated for the life of
//! the process, driven by [`revalidate`](SessionStore::revalidate),
//! [`login`](SessionStore::login), and unauthorized responses reported
//! through [`notify_unauthorized`](SessionStore::notify_unauthorized).

use crate::config::SessionConfig;
use crate::credential::{Credential, authorization_header_value};
use crate::error::{SessionError, TransportError};
use crate::profile::UserProfile;
use crate::state::{SessionPhase, SessionState};
use crate::storage::{CredentialStorage, FileCredentialStorage};
use crate::transport::{
    ApiRequest, ApiResponse, ApiTransport, HttpTransport, RequestOptions, StatusCode,
};
use lantern_core::Result;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Mutex as AsyncMutex, watch};
use tracing::{debug, instrument, warn};

/// Outcome of one identity check against the remote service.
enum IdentityOutcome {
    /// The credential is valid; here is the profile.
    Valid(UserProfile),
    /// The credential was rejected outright.
    Unauthorized,
    /// Network failure, decode failure, or an unexpected status.
    Transient,
}

/// Successful sign-in grant returned by the sign-in endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInGrant {
    access_token: String,
}

/// Owns the session and decorates outbound requests with the credential.
pub struct SessionStore {
    state: Mutex<SessionState>,
    storage: Arc<dyn CredentialStorage>,
    transport: Arc<dyn ApiTransport>,
    config: SessionConfig,
    /// Serializes identity checks: at most one outstanding revalidation.
    revalidation: AsyncMutex<()>,
    /// Count of finished identity checks. A caller that held a smaller
    /// count while waiting for the lock adopts the finished check's
    /// outcome instead of issuing its own request.
    completed_checks: AtomicU64,
    /// Bumped whenever the credential is replaced or cleared, so an
    /// identity check that raced a credential change discards its result.
    credential_epoch: AtomicU64,
    /// True while an identity check's network request is in flight.
    checking: AtomicBool,
    ready: watch::Sender<bool>,
}

impl SessionStore {
    /// Creates a store over explicit storage and transport collaborators.
    #[must_use]
    pub fn new(
        config: SessionConfig,
        storage: Arc<dyn CredentialStorage>,
        transport: Arc<dyn ApiTransport>,
    ) -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            state: Mutex::new(SessionState::new()),
            storage,
            transport,
            config,
            revalidation: AsyncMutex::new(()),
            completed_checks: AtomicU64::new(0),
            credential_epoch: AtomicU64::new(0),
            checking: AtomicBool::new(false),
            ready,
        }
    }

    /// Creates a store with file-backed storage and an HTTP transport,
    /// both derived from the configuration.
    pub fn from_config(config: SessionConfig) -> std::result::Result<Self, TransportError> {
        let storage = Arc::new(FileCredentialStorage::new(
            &config.storage_dir,
            &config.storage_key,
        ));
        let transport = Arc::new(HttpTransport::new(&config.api_base_url)?);
        Ok(Self::new(config, storage, transport))
    }

    /// Restores a persisted credential and closes the restoration window.
    ///
    /// Runs once at process start; calling it again is a no-op. The
    /// restored credential is not verified here; the first gating check
    /// triggers that. `initializing` goes false unconditionally, even
    /// when nothing was persisted or the storage read fails (a failed
    /// read is logged and treated as "no session").
    pub fn initialize(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if !state.is_initializing() {
                return;
            }

            let restored = match self.storage.load() {
                Ok(raw) => raw.map(Credential::new),
                Err(e) => {
                    warn!(error = %e, "credential restore failed, starting without a session");
                    None
                }
            };

            debug!(restored = restored.is_some(), "session restoration finished");
            state.finish_restore(restored);
        }

        let _ = self.ready.send(true);
    }

    /// Resolves once `initialize` has completed.
    ///
    /// Gating checks await this so no view renders before the
    /// restoration window has closed.
    pub async fn ready(&self) {
        let mut rx = self.ready.subscribe();
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// Returns the current credential, if any.
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.state.lock().unwrap().credential().cloned()
    }

    /// Returns the cached profile, if any.
    #[must_use]
    pub fn profile(&self) -> Option<UserProfile> {
        self.state.lock().unwrap().profile().cloned()
    }

    /// Returns true only during the startup restoration window.
    #[must_use]
    pub fn is_initializing(&self) -> bool {
        self.state.lock().unwrap().is_initializing()
    }

    /// Returns the session's lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        let phase = self.state.lock().unwrap().phase();
        if phase == SessionPhase::NoSession && self.checking.load(Ordering::Acquire) {
            return SessionPhase::Authenticating;
        }
        phase
    }

    /// Replaces the credential and synchronously persists it.
    ///
    /// Overwrites any previously persisted value; no merge semantics.
    /// Does not trigger revalidation. Any cached profile is dropped: a
    /// profile is only meaningful as the revalidation result of the
    /// credential it was fetched under.
    pub fn set_credential(&self, credential: Credential) -> Result<(), SessionError> {
        self.storage
            .store(credential.as_str())
            .map_err(|e| SessionError::StorageFailed {
                details: e.to_string(),
            })?;

        self.state.lock().unwrap().set_credential(credential);
        self.credential_epoch.fetch_add(1, Ordering::AcqRel);
        debug!("credential replaced");
        Ok(())
    }

    /// Nulls the credential and profile, and erases the persisted copy.
    ///
    /// Eager erasure keeps a dead session from resurrecting on the next
    /// process start. Idempotent: clearing an already-clear session is
    /// a successful no-op.
    pub fn clear_credential(&self) -> Result<(), SessionError> {
        self.state.lock().unwrap().clear();
        self.credential_epoch.fetch_add(1, Ordering::AcqRel);

        self.storage
            .erase()
            .map_err(|e| SessionError::StorageFailed {
                details: e.to_string(),
            })?;

        debug!("session cleared");
        Ok(())
    }

    /// Clears the session in response to a login-flow sign-out.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.clear_credential()
    }

    /// Records that an authorized request somewhere in the application
    /// was rejected as unauthorized.
    ///
    /// This is the cross-cutting Authenticated → NoSession edge: the
    /// store cannot see every response, so callers report dead
    /// credentials here. A subsequent gating check revalidates from
    /// scratch instead of trusting the stale cached profile.
    pub fn notify_unauthorized(&self) {
        debug!("unauthorized response reported, clearing session");
        if let Err(e) = self.clear_credential() {
            warn!(error = %e, "failed to erase persisted credential");
        }
    }

    /// Sends a request decorated with the current credential.
    ///
    /// The `Authorization` header carries the credential verbatim; when
    /// no credential is held the literal `Bearer null` is sent, which
    /// the remote side is expected to reject. Any `Authorization` header
    /// in the caller's options is replaced. This performs no side
    /// effects on session state; callers that receive a 401 should
    /// report it via [`notify_unauthorized`](Self::notify_unauthorized).
    pub async fn authorized_request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> std::result::Result<ApiResponse, TransportError> {
        let header = authorization_header_value(self.state.lock().unwrap().credential());

        let mut request = ApiRequest::from_options(path, options);
        request
            .headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case("authorization"));
        request.headers.push(("Authorization".to_string(), header));

        self.transport.execute(request).await
    }

    /// Confirms the credential against the identity endpoint and caches
    /// the resulting profile.
    ///
    /// This is a read that may invalidate: a 401 from the identity
    /// endpoint clears the session as a side effect. Callers asserting
    /// on the outcome should inspect state, not just the return value.
    ///
    /// Returns `None` for "no session", which covers a null credential,
    /// a rejected credential, and transient failures alike. The caller
    /// cannot distinguish "not logged in" from "network down" here; an
    /// accepted limitation of this core.
    ///
    /// Concurrent calls are coalesced: at most one identity check is
    /// outstanding, and callers that arrive while one is in flight adopt
    /// its outcome rather than issuing their own request.
    #[instrument(skip(self))]
    pub async fn revalidate(&self) -> Option<UserProfile> {
        if self.credential().is_none() {
            return None;
        }

        let ticket = self.completed_checks.load(Ordering::Acquire);
        let _guard = self.revalidation.lock().await;

        if self.completed_checks.load(Ordering::Acquire) != ticket {
            // A check finished while we waited for the lock; its outcome
            // is ours too.
            return self.profile();
        }

        // The credential may have been cleared while we waited.
        self.credential()?;
        let epoch = self.credential_epoch.load(Ordering::Acquire);

        self.checking.store(true, Ordering::Release);
        let outcome = self.identity_check().await;
        self.checking.store(false, Ordering::Release);
        self.completed_checks.fetch_add(1, Ordering::AcqRel);

        let epoch_unchanged = self.credential_epoch.load(Ordering::Acquire) == epoch;
        match outcome {
            IdentityOutcome::Valid(profile) => {
                if !epoch_unchanged {
                    debug!("discarding identity check result for a replaced credential");
                    return None;
                }
                self.state.lock().unwrap().store_profile(profile.clone());
                debug!(user = %profile.user_id(), "credential confirmed");
                Some(profile)
            }
            IdentityOutcome::Unauthorized => {
                if epoch_unchanged {
                    debug!("credential rejected by identity endpoint");
                    if let Err(e) = self.clear_credential() {
                        warn!(error = %e, "failed to erase rejected credential");
                    }
                }
                None
            }
            IdentityOutcome::Transient => None,
        }
    }

    /// One GET against the identity endpoint, classified.
    async fn identity_check(&self) -> IdentityOutcome {
        let response = match self
            .authorized_request(&self.config.identity_path, RequestOptions::get())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "identity check did not reach the remote service");
                return IdentityOutcome::Transient;
            }
        };

        match response.status {
            StatusCode::OK => match response.json::<UserProfile>() {
                Ok(profile) => IdentityOutcome::Valid(profile),
                Err(e) => {
                    warn!(error = %e, "identity endpoint returned an unreadable profile");
                    IdentityOutcome::Transient
                }
            },
            StatusCode::UNAUTHORIZED => IdentityOutcome::Unauthorized,
            status => {
                warn!(status = %status, "unexpected identity endpoint status");
                IdentityOutcome::Transient
            }
        }
    }

    /// Signs in against the remote service and installs the granted
    /// credential.
    ///
    /// Does not fetch the profile; the next gating check revalidates the
    /// fresh credential. A rejection surfaces the service's own message
    /// so the login form can display it.
    #[instrument(skip(self, password))]
    pub async fn login(&self, login: &str, password: &str) -> Result<(), SessionError> {
        let request = ApiRequest::from_options(
            &self.config.signin_path,
            RequestOptions::post()
                .with_header("Accept", "application/json")
                .with_json_body(json!({ "login": login, "password": password })),
        );

        let response =
            self.transport
                .execute(request)
                .await
                .map_err(|e| SessionError::LoginUnreachable {
                    details: e.to_string(),
                })?;

        if response.status == StatusCode::OK {
            let grant: SignInGrant =
                response
                    .json()
                    .map_err(|e| SessionError::InvalidLoginResponse {
                        details: e.to_string(),
                    })?;
            self.set_credential(Credential::new(grant.access_token))?;
            debug!("sign-in succeeded");
            return Ok(());
        }

        let message = response
            .json::<JsonValue>()
            .ok()
            .and_then(|body| body.get("msg").and_then(JsonValue::as_str).map(String::from))
            .unwrap_or_else(|| format!("sign-in refused with status {}", response.status));

        debug!(status = %response.status, "sign-in rejected");
        Err(SessionError::LoginRejected { message }.into())
    }
}
