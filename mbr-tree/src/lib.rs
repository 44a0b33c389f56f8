//! # MBR Tree - In-Memory R-Tree for 2D Boxes and Points
//!
//! This crate provides a generalized R-Tree that maps axis-aligned bounding
//! boxes (and points, as zero-size boxes) to arbitrary values, with lazy
//! queries under several match semantics.
//!
//! ## Features
//!
//! - **Multimap**: Duplicate boxes and duplicate `(box, value)` pairs are kept
//! - **Match Semantics**: Equal, Contained, Contains and Intersect queries
//! - **Lazy Queries**: Results are produced on demand and can be abandoned
//! - **Condensing Deletes**: Underfull nodes are dissolved and reinserted
//! - **Pluggable**: Coordinate geometry and split strategy are trait parameters
//! - **Bulk Loading**: Hilbert-ordered insertion for tighter trees
//!
//! ## Quick Start
//!
//! ```rust
//! use mbr_tree::{BoundingBox, MatchType, MbrTree, TreeConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tree = MbrTree::new(TreeConfig::default())?;
//!
//! // Add entries
//! tree.add_box(1, 0.0, 0.0, 10.0, 10.0)?;
//! tree.add_point(2, 5.0, 5.0)?;
//!
//! // Find intersecting entries
//! let query = BoundingBox::new(4.0, 4.0, 6.0, 6.0);
//! let mut found: Vec<i32> = tree
//!     .get(&query, None, MatchType::Intersect)
//!     .map(|(value, _)| *value)
//!     .collect();
//! found.sort();
//! assert_eq!(found, vec![1, 2]);
//!
//! // Remove the point and check the structure
//! tree.delete_point(5.0, 5.0, Some(&2), MatchType::Equal)?;
//! tree.assert_consistent()?;
//! # Ok(())
//! # }
//! ```

// Core geometry
pub mod bounding_box;
pub mod geometry;
pub mod hilbert;

// R-Tree engine
pub mod mbr_tree;

// Re-export geometry types
pub use bounding_box::BoundingBox;
pub use geometry::{Cartesian, Geometry};

// Re-export R-Tree types
pub use mbr_tree::{
    DumpEntry, LinearSplit, MatchType, MbrTree, Query, SplitEntry, SplitGroup, SplitStrategy,
    TreeConfig, TreeError, TreeResult, TreeStats,
};
