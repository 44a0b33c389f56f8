//! Core types and data structures for the in-memory R-Tree.
//!
//! This module defines the fundamental types used throughout the tree:
//! - Error types and result types
//! - Match semantics for queries and deletes
//! - Node types (Leaf and Internal) and their entries
//! - Statistics and introspection structures

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bounding_box::BoundingBox;
use crate::geometry::Geometry;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur in tree operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cannot add node at height {target} in {}", describe_height(.height))]
    HeightMismatch {
        target: usize,
        height: Option<usize>,
    },

    #[error("Internal consistency violation: {0}")]
    InternalConsistency(String),
}

fn describe_height(height: &Option<usize>) -> String {
    match height {
        Some(height) => format!("tree of height {}", height),
        None => "empty tree".to_string(),
    }
}

/// Result type for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

// ============================================================================
// Match Semantics
// ============================================================================

/// Controls how a query box is matched against stored boxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    /// Stored box is exactly equal to the query box
    #[default]
    Equal,
    /// Stored box contains the query box
    Contained,
    /// Query box contains the stored box
    Contains,
    /// Query box and stored box overlap
    Intersect,
}

impl MatchType {
    /// Leaf acceptance test.
    pub(crate) fn accepts<G: Geometry>(
        self,
        geometry: &G,
        query: &BoundingBox,
        stored: &BoundingBox,
    ) -> bool {
        match self {
            MatchType::Equal => stored == query,
            MatchType::Contained => geometry.contains(stored, query),
            MatchType::Contains => geometry.contains(query, stored),
            MatchType::Intersect => geometry.intersects(query, stored),
        }
    }

    /// Necessary condition on a subtree box for any leaf below it to be accepted.
    pub(crate) fn may_descend<G: Geometry>(
        self,
        geometry: &G,
        query: &BoundingBox,
        subtree: &BoundingBox,
    ) -> bool {
        match self {
            MatchType::Equal | MatchType::Contained => geometry.contains(subtree, query),
            MatchType::Contains | MatchType::Intersect => geometry.intersects(subtree, query),
        }
    }
}

// ============================================================================
// Node Types
// ============================================================================

/// An entry in a leaf node
#[derive(Debug, Clone, PartialEq)]
pub struct LeafEntry<V> {
    pub bbox: BoundingBox,
    pub value: V,
}

/// A child reference in an internal node. `bbox` is the tight bound of the
/// child's whole subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildEntry<V> {
    pub bbox: BoundingBox,
    pub node: Node<V>,
}

/// Node types in the R-Tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node<V> {
    /// Leaf node containing actual entries, always at height 0
    Leaf { entries: Vec<LeafEntry<V>> },
    /// Internal node containing child references
    Internal {
        children: Vec<ChildEntry<V>>,
        level: usize, // Height from leaf level (leaves are 0)
    },
}

impl<V> Node<V> {
    /// Height of this node above the leaves.
    pub fn level(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { level, .. } => *level,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    pub fn len(&self) -> usize {
        match self {
            Node::Leaf { entries } => entries.len(),
            Node::Internal { children, .. } => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the bounding box enclosing all children/entries, `None` for an empty node
    pub fn compute_bbox<G: Geometry>(&self, geometry: &G) -> Option<BoundingBox> {
        match self {
            Node::Leaf { entries } => geometry.merge_all(entries.iter().map(|e| &e.bbox)),
            Node::Internal { children, .. } => {
                geometry.merge_all(children.iter().map(|c| &c.bbox))
            }
        }
    }

    /// Consumes the node, returning its entries tagged for reinsertion at this
    /// node's height.
    pub(crate) fn into_entries(self) -> Vec<Entry<V>> {
        match self {
            Node::Leaf { entries } => entries.into_iter().map(Entry::Leaf).collect(),
            Node::Internal { children, .. } => children.into_iter().map(Entry::Child).collect(),
        }
    }

    /// Consumes the node, appending every leaf entry of its subtree to `out`.
    pub(crate) fn collect_leaves(self, out: &mut Vec<LeafEntry<V>>) {
        match self {
            Node::Leaf { entries } => out.extend(entries),
            Node::Internal { children, .. } => {
                for child in children {
                    child.node.collect_leaves(out);
                }
            }
        }
    }
}

/// An entry detached from its node: either a stored value, or a whole subtree
/// hanging off an internal node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Entry<V> {
    Leaf(LeafEntry<V>),
    Child(ChildEntry<V>),
}

impl<V> Entry<V> {
    /// Height of the node this entry must be placed in.
    pub(crate) fn target_level(&self) -> usize {
        match self {
            Entry::Leaf(_) => 0,
            Entry::Child(child) => child.node.level() + 1,
        }
    }

    pub(crate) fn bbox(&self) -> &BoundingBox {
        match self {
            Entry::Leaf(leaf) => &leaf.bbox,
            Entry::Child(child) => &child.bbox,
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Structural statistics about a tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    /// Stored (box, value) entries
    pub total_entries: usize,
    /// Height of the root, `None` when empty
    pub tree_height: Option<usize>,
    /// All nodes, leaves included
    pub node_count: usize,
    pub leaf_count: usize,
}

/// One row of [`crate::MbrTree::dump`]: a node entry in depth-first preorder.
#[derive(Debug, Clone, PartialEq)]
pub struct DumpEntry<'a, V> {
    /// Height of the node holding this entry
    pub height: usize,
    pub bbox: BoundingBox,
    /// The stored value for leaf entries, `None` for child references and the
    /// synthetic root row
    pub value: Option<&'a V>,
}
