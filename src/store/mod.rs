//! Tree Store
//!
//! In-memory, append-only registry of generated trees. Entries are created
//! once on successful extraction, never mutated, and removed only by
//! explicit delete. Ids are generated by the store, so concurrent `put`
//! calls never contend on anything beyond the map insert itself. Nothing
//! survives process exit.

pub mod export;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::ai::ModelId;
use crate::types::{KnowledgeNode, TreeId};

/// One generated tree with its provenance.
#[derive(Debug, Clone)]
pub struct StoredTree {
    pub id: TreeId,
    pub tree: KnowledgeNode,
    pub source_files: Vec<String>,
    pub model: ModelId,
    pub created_at: DateTime<Utc>,
}

/// Keyed map of generated trees.
#[derive(Default)]
pub struct TreeStore {
    trees: DashMap<TreeId, StoredTree>,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly generated tree and return its id.
    pub fn put(
        &self,
        tree: KnowledgeNode,
        source_files: Vec<String>,
        model: ModelId,
    ) -> TreeId {
        let id = TreeId::generate();
        self.trees.insert(
            id.clone(),
            StoredTree {
                id: id.clone(),
                tree,
                source_files,
                model,
                created_at: Utc::now(),
            },
        );
        id
    }

    pub fn get(&self, id: &TreeId) -> Option<StoredTree> {
        self.trees.get(id).map(|entry| entry.value().clone())
    }

    /// Remove a tree; returns whether it existed.
    pub fn delete(&self, id: &TreeId) -> bool {
        self.trees.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn ids(&self) -> Vec<TreeId> {
        self.trees.iter().map(|entry| entry.key().clone()).collect()
    }

    // =========================================================================
    // Exports
    // =========================================================================

    /// Pretty-printed JSON mirror of the tree, `None` for unknown ids.
    pub fn to_json(&self, id: &TreeId) -> Option<String> {
        self.get(id).map(|stored| export::tree_to_json(&stored.tree))
    }

    /// Markdown rendering with a metadata footer, `None` for unknown ids.
    pub fn to_markdown(&self, id: &TreeId) -> Option<String> {
        self.get(id).map(|stored| export::tree_to_markdown(&stored))
    }

    /// SVG rendering with an inlined stylesheet, `None` for unknown ids.
    pub fn to_svg(&self, id: &TreeId) -> Option<String> {
        self.get(id).map(|stored| export::tree_to_svg(&stored.tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> KnowledgeNode {
        KnowledgeNode::branch(
            "Machine Learning",
            vec![
                KnowledgeNode::leaf("Supervised"),
                KnowledgeNode::leaf("Unsupervised"),
            ],
        )
    }

    #[test]
    fn test_put_get_round_trip() {
        let store = TreeStore::new();
        let id = store.put(
            sample_tree(),
            vec!["notes.txt".to_string()],
            ModelId::Gpt4o,
        );

        let stored = store.get(&id).unwrap();
        assert_eq!(stored.tree.title, "Machine Learning");
        assert_eq!(stored.source_files, vec!["notes.txt"]);
        assert_eq!(stored.model, ModelId::Gpt4o);
        assert_eq!(stored.id, id);
    }

    #[test]
    fn test_each_put_gets_a_distinct_id() {
        let store = TreeStore::new();
        let a = store.put(sample_tree(), Vec::new(), ModelId::Gpt4o);
        let b = store.put(sample_tree(), Vec::new(), ModelId::GeminiFlash);
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_delete_reports_existence() {
        let store = TreeStore::new();
        let id = store.put(sample_tree(), Vec::new(), ModelId::Gpt4o);

        assert!(store.delete(&id));
        assert!(!store.delete(&id));
        assert!(store.get(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_exports_return_none_for_unknown_id() {
        let store = TreeStore::new();
        let unknown = TreeId::new("tree-0-00000000");
        assert!(store.to_json(&unknown).is_none());
        assert!(store.to_markdown(&unknown).is_none());
        assert!(store.to_svg(&unknown).is_none());
    }
}
