//! Role ranges gating access to a protected view.

use serde::{Deserialize, Serialize};

/// An access-level interval attached to a protected view.
///
/// A role `r` is admitted when `min <= r < max`: the minimum is
/// inclusive, the maximum exclusive. A range with `min >= max` admits
/// nobody; that is accepted configuration (the view simply always
/// redirects), not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRange {
    /// Minimum role, inclusive.
    #[serde(default)]
    min: u32,
    /// Maximum role, exclusive.
    #[serde(default = "default_max")]
    max: u32,
    /// Where to send an authenticated user whose role falls outside the
    /// range.
    #[serde(default = "default_fallback_path")]
    fallback_path: String,
}

fn default_max() -> u32 {
    100
}

fn default_fallback_path() -> String {
    "/".to_string()
}

impl RoleRange {
    /// Creates a role range.
    #[must_use]
    pub fn new(min: u32, max: u32, fallback_path: impl Into<String>) -> Self {
        Self {
            min,
            max,
            fallback_path: fallback_path.into(),
        }
    }

    /// Returns the inclusive minimum role.
    #[must_use]
    pub fn min(&self) -> u32 {
        self.min
    }

    /// Returns the exclusive maximum role.
    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Returns the fallback redirect path.
    #[must_use]
    pub fn fallback_path(&self) -> &str {
        &self.fallback_path
    }

    /// Returns true if the role falls inside the range.
    #[must_use]
    pub fn admits(&self, role: u32) -> bool {
        self.min <= role && role < self.max
    }
}

impl Default for RoleRange {
    /// Any authenticated user: `0 <= r < 100`, falling back to the root
    /// path.
    fn default() -> Self {
        Self::new(0, default_max(), default_fallback_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_range_admits_any_ordinary_role() {
        let range = RoleRange::default();
        assert_eq!(range.min(), 0);
        assert_eq!(range.max(), 100);
        assert_eq!(range.fallback_path(), "/");
        assert!(range.admits(0));
        assert!(range.admits(99));
    }

    #[test]
    fn minimum_is_inclusive() {
        let range = RoleRange::new(10, 100, "/");
        assert!(range.admits(10));
        assert!(!range.admits(9));
    }

    #[test]
    fn maximum_is_exclusive() {
        let range = RoleRange::new(0, 50, "/");
        assert!(range.admits(49));
        assert!(!range.admits(50));
    }

    #[test]
    fn empty_range_admits_nobody() {
        let range = RoleRange::new(50, 50, "/");
        assert!(!range.admits(49));
        assert!(!range.admits(50));
        assert!(!range.admits(51));

        let inverted = RoleRange::new(60, 40, "/");
        assert!(!inverted.admits(50));
    }

    #[test]
    fn deserializes_with_defaults() {
        let range: RoleRange = serde_json::from_str(r#"{"min": 20}"#).expect("parse");
        assert_eq!(range.min(), 20);
        assert_eq!(range.max(), 100);
        assert_eq!(range.fallback_path(), "/");
    }
}
