//! Session ownership and authorized requests for the lantern dashboard
//! client.
//!
//! This crate provides:
//! - The bearer `Credential` and its durable persistence
//! - The authenticated `UserProfile`, derived from the identity endpoint
//! - `SessionState` and its lifecycle phases
//! - `SessionStore`, the sole owner and mutator of the session
//!
//! # Model
//!
//! A persisted credential restored at startup is a *candidate*: it is
//! not trusted until the remote identity endpoint confirms it
//! ([`SessionStore::revalidate`]). A rejected credential clears the
//! session, including the persisted copy. The store never attaches the
//! credential to a request anywhere but
//! [`SessionStore::authorized_request`].
//!
//! # Example
//!
//! ```no_run
//! use lantern_session::{SessionConfig, SessionStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SessionStore::from_config(SessionConfig::new("https://api.example.com"))?;
//! store.initialize();
//!
//! match store.revalidate().await {
//!     Some(profile) => println!("signed in as {}", profile.username()),
//!     None => println!("no session"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credential;
pub mod error;
pub mod profile;
pub mod state;
pub mod storage;
pub mod store;
pub mod transport;

// Re-export main types at crate root
pub use config::SessionConfig;
pub use credential::{Credential, authorization_header_value};
pub use error::{SessionError, StorageError, TransportError};
pub use profile::UserProfile;
pub use state::{SessionPhase, SessionState};
pub use storage::{CredentialStorage, FileCredentialStorage, MemoryCredentialStorage};
pub use store::SessionStore;
pub use transport::{
    ApiRequest, ApiResponse, ApiTransport, HttpTransport, Method, RequestOptions, StatusCode,
};
