//! In-memory R-Tree engine.
//!
//! The tree keeps every node at a fixed height above the leaves, so all leaf
//! nodes sit at height 0 and the tree grows and shrinks only at the root:
//! - Inserts descend by least enlargement and split overflowing nodes upwards
//! - Deletes cut out underfull nodes and reinsert their entries at the height
//!   they came from
//! - Queries walk lazily, pruning subtrees by their bounding boxes

pub mod query;
pub mod split;
pub mod tree_config;
pub mod tree_types;
mod tree_impl;

pub use query::Query;
pub use split::{LinearSplit, SplitEntry, SplitGroup, SplitStrategy};
pub use tree_config::{TreeConfig, DEFAULT_MAX_ENTRIES};
pub use tree_types::{
    ChildEntry, DumpEntry, LeafEntry, MatchType, Node, TreeError, TreeResult, TreeStats,
};
pub use tree_impl::MbrTree;
