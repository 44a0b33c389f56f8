//! Overflow splitting.
//!
//! When a node grows past `max_entries` its entries are handed to a
//! [`SplitStrategy`], which partitions them into two groups that each hold at
//! least `min_entries`. The engine only depends on the trait; [`LinearSplit`]
//! is the strategy shipped here.

use std::fmt::Debug;

use crate::bounding_box::BoundingBox;
use crate::geometry::Geometry;

use super::tree_types::{ChildEntry, LeafEntry};

/// What a split strategy needs to know about an entry.
pub trait SplitEntry {
    fn bbox(&self) -> &BoundingBox;

    /// Number of entries in the referenced child node, `None` for leaf entries.
    fn fan_out(&self) -> Option<usize>;
}

impl<V> SplitEntry for LeafEntry<V> {
    fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    fn fan_out(&self) -> Option<usize> {
        None
    }
}

impl<V> SplitEntry for ChildEntry<V> {
    fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    fn fan_out(&self) -> Option<usize> {
        Some(self.node.len())
    }
}

/// One half of a split: its entries and their tight bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitGroup<E> {
    pub bbox: BoundingBox,
    pub entries: Vec<E>,
}

impl<E: SplitEntry> SplitGroup<E> {
    fn seeded(entry: E) -> Self {
        Self {
            bbox: *entry.bbox(),
            entries: vec![entry],
        }
    }
}

/// Partitions an overflowing entry set into two valid nodes.
///
/// Implementations must return two groups that together hold every input
/// entry exactly once, each with `min_entries..=entries.len() - min_entries`
/// entries, and whose boxes are the merge of their entries.
pub trait SplitStrategy: Debug {
    /// `extent` is the bounding box of the whole tree, including the entry
    /// whose insertion caused the overflow.
    fn split<G, E>(
        &self,
        geometry: &G,
        entries: Vec<E>,
        min_entries: usize,
        extent: &BoundingBox,
    ) -> (SplitGroup<E>, SplitGroup<E>)
    where
        G: Geometry,
        E: SplitEntry;
}

/// The choice made by [`least_enlargement`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BestFit {
    pub index: usize,
    /// Candidate box merged with the new box
    pub merged: BoundingBox,
}

struct Candidate {
    fit: BestFit,
    area: f64,
    delta: f64,
    count: usize,
}

/// Picks the candidate whose box grows least in area when `bbox` is added.
///
/// Ties go to the smaller merged area. With `balance` set (internal levels
/// only) a remaining tie goes to the candidate with fewer entries below it.
/// Returns `None` only for an empty candidate list.
pub(crate) fn least_enlargement<'a, G, I>(
    geometry: &G,
    candidates: I,
    bbox: &BoundingBox,
    balance: bool,
) -> Option<BestFit>
where
    G: Geometry,
    I: IntoIterator<Item = (&'a BoundingBox, usize)>,
{
    let mut best: Option<Candidate> = None;
    for (index, (candidate, count)) in candidates.into_iter().enumerate() {
        let merged = geometry.merge(candidate, bbox);
        let area = geometry.area(&merged);
        let delta = area - geometry.area(candidate);
        let better = match &best {
            None => true,
            Some(b) => {
                delta < b.delta
                    || (delta == b.delta && area < b.area)
                    || (delta == b.delta && area == b.area && balance && count < b.count)
            }
        };
        if better {
            best = Some(Candidate {
                fit: BestFit { index, merged },
                area,
                delta,
                count,
            });
        }
    }
    best.map(|b| b.fit)
}

/// Guttman's linear-cost split.
///
/// Seeds are the owners of the greatest lower bound and the least upper bound
/// on the axis where `least upper - greatest lower`, normalized by the tree
/// extent so the axes compare, is larger. The rest are
/// assigned greedily by least enlargement, consuming the input from the back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinearSplit;

impl LinearSplit {
    /// Returns the seed indices on the winning axis as (owner of the greatest
    /// lower bound, owner of the least upper bound).
    fn pick_seeds<E: SplitEntry>(entries: &[E], extent: &BoundingBox) -> (usize, usize) {
        // [x, y] greatest lower bound and least upper bound, with their owners
        let first = entries[0].bbox();
        let mut low = [first.min_x, first.min_y];
        let mut high = [first.max_x, first.max_y];
        let mut low_index = [0usize; 2];
        let mut high_index = [0usize; 2];

        for (i, entry) in entries.iter().enumerate().skip(1) {
            let bbox = entry.bbox();
            let lows = [bbox.min_x, bbox.min_y];
            let highs = [bbox.max_x, bbox.max_y];
            for axis in 0..2 {
                if lows[axis] > low[axis] {
                    low[axis] = lows[axis];
                    low_index[axis] = i;
                }
                if highs[axis] < high[axis] {
                    high[axis] = highs[axis];
                    high_index[axis] = i;
                }
            }
        }

        let norm = [extent.width(), extent.height()];
        let separation = [0, 1].map(|axis| {
            if norm[axis] > 0.0 {
                (high[axis] - low[axis]) / norm[axis]
            } else {
                0.0
            }
        });

        if separation[0] > separation[1] && low_index[0] != high_index[0] {
            (low_index[0], high_index[0])
        } else if separation[0] < separation[1] && low_index[1] != high_index[1] {
            (low_index[1], high_index[1])
        } else {
            (0, 1)
        }
    }
}

impl SplitStrategy for LinearSplit {
    fn split<G, E>(
        &self,
        geometry: &G,
        mut entries: Vec<E>,
        min_entries: usize,
        extent: &BoundingBox,
    ) -> (SplitGroup<E>, SplitGroup<E>)
    where
        G: Geometry,
        E: SplitEntry,
    {
        debug_assert!(entries.len() >= 2, "cannot split fewer than two entries");

        let balance = entries[0].fan_out().is_some();
        let (i, j) = Self::pick_seeds(&entries, extent);
        let (first, second) = if i > j {
            let first = entries.remove(i);
            (first, entries.remove(j))
        } else {
            let second = entries.remove(j);
            (entries.remove(i), second)
        };
        let mut groups = [SplitGroup::seeded(first), SplitGroup::seeded(second)];

        while !entries.is_empty() {
            // a group that can only reach the floor by taking everything left gets it all
            if let Some(group) = groups
                .iter_mut()
                .find(|g| g.entries.len() + entries.len() == min_entries)
            {
                group.entries.append(&mut entries);
                if let Some(bbox) = geometry.merge_all(group.entries.iter().map(|e| e.bbox())) {
                    group.bbox = bbox;
                }
                break;
            }

            let Some(entry) = entries.pop() else { break };
            let best = least_enlargement(
                geometry,
                groups.iter().map(|g| (&g.bbox, g.entries.len())),
                entry.bbox(),
                balance,
            );
            if let Some(best) = best {
                let group = &mut groups[best.index];
                group.bbox = best.merged;
                group.entries.push(entry);
            }
        }

        let [first, second] = groups;
        (first, second)
    }
}
