//! Role-gated view guarding for the lantern dashboard client.
//!
//! This crate provides:
//! - `RoleRange`: inclusive-minimum, exclusive-maximum access intervals
//! - `Navigator`: the seam to the external routing collaborator
//! - `RouteGuard`: the per-view gate over a shared
//!   [`SessionStore`](lantern_session::SessionStore)
//!
//! # Example
//!
//! ```no_run
//! use lantern_guard::{CheckOutcome, RoleRange, RouteGuard};
//! use lantern_session::{SessionConfig, SessionStore};
//! use std::sync::Arc;
//!
//! # struct AppRouter;
//! # impl lantern_guard::Navigator for AppRouter {
//! #     fn redirect(&self, _path: &str) {}
//! # }
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SessionStore::from_config(SessionConfig::new(
//!     "https://api.example.com",
//! ))?);
//! store.initialize();
//!
//! // Admins only: roles 50 (inclusive) to 100 (exclusive).
//! let guard = RouteGuard::new(store, Arc::new(AppRouter))
//!     .with_range(RoleRange::new(50, 100, "/"));
//!
//! if guard.check().await == CheckOutcome::Granted {
//!     // render the protected view
//! }
//! # Ok(())
//! # }
//! ```

pub mod guard;
pub mod navigator;
pub mod range;

// Re-export main types at crate root
pub use guard::{CheckOutcome, GuardView, RouteGuard};
pub use navigator::Navigator;
pub use range::RoleRange;
