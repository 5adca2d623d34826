//! Knowledge Tree Node
//!
//! The canonical tree value produced by extraction and consumed by the
//! store and exporters. The structure is parsed fresh from model text each
//! time and never mutated in place, so it is a tree by construction.

use serde::{Deserialize, Serialize};

/// One node of a knowledge tree.
///
/// The canonical field name for a node label is `title`; `name` is accepted
/// as an input alias because the two source front ends disagreed. Output
/// always serializes `title`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeNode {
    #[serde(alias = "name")]
    pub title: String,

    /// Brief overview of this node's subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Detailed information, including relevant source notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Ordered child nodes. Never null: a missing field deserializes to an
    /// empty sequence.
    #[serde(default)]
    pub children: Vec<KnowledgeNode>,
}

impl KnowledgeNode {
    /// Create a leaf node with a title only.
    pub fn leaf(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: None,
            content: None,
            children: Vec::new(),
        }
    }

    /// Create a node with children.
    pub fn branch(title: impl Into<String>, children: Vec<KnowledgeNode>) -> Self {
        Self {
            title: title.into(),
            summary: None,
            content: None,
            children,
        }
    }

    /// Total number of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(KnowledgeNode::node_count)
            .sum::<usize>()
    }

    /// Depth of the deepest leaf, where a childless node has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(KnowledgeNode::depth)
            .max()
            .unwrap_or(0)
    }

    /// Number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(KnowledgeNode::leaf_count).sum()
        }
    }
}
