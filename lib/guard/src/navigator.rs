//! Navigation collaborator.
//!
//! The guard never renders redirects itself; it hands an opaque
//! destination to whatever owns page routing.

/// External navigation collaborator.
pub trait Navigator: Send + Sync {
    /// Navigates away to the given destination.
    fn redirect(&self, path: &str);
}
