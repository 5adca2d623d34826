pub mod error;
pub mod node;

pub use error::{Result, TreeError};
pub use node::KnowledgeNode;

// =============================================================================
// Domain Newtypes
// =============================================================================

use std::fmt;

/// Type-safe wrapper for stored tree identifiers.
///
/// Ids combine a millisecond timestamp with a random suffix so concurrent
/// generations never collide without any coordination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreeId(String);

impl TreeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id: `tree-<unix millis>-<random hex>`.
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: u32 = rand::random();
        Self(format!("tree-{}-{:08x}", millis, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TreeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TreeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TreeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod newtype_tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = TreeId::generate();
        let b = TreeId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_id_shape() {
        let id = TreeId::generate();
        assert!(id.as_str().starts_with("tree-"));
        assert_eq!(id.as_str().split('-').count(), 3);
    }

    #[test]
    fn test_display_round_trip() {
        let id = TreeId::new("tree-1-deadbeef");
        assert_eq!(format!("{}", id), "tree-1-deadbeef");
        assert_eq!(TreeId::from("tree-1-deadbeef"), id);
    }
}
