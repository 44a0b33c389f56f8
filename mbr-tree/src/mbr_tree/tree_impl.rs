//! MbrTree implementation.

use std::fmt::Debug;

use crate::bounding_box::BoundingBox;
use crate::geometry::{Cartesian, Geometry};
use crate::hilbert::HilbertOrder;

use super::query::Query;
use super::split::{least_enlargement, LinearSplit, SplitEntry, SplitStrategy};
use super::tree_config::{TreeConfig, DEFAULT_MAX_ENTRIES};
use super::tree_types::{
    ChildEntry, DumpEntry, Entry, LeafEntry, MatchType, Node, TreeError, TreeResult, TreeStats,
};

/// An in-memory R-Tree mapping bounding boxes (and points) to values.
///
/// The tree is a multimap: the same box may hold several values and the same
/// `(box, value)` pair may be stored more than once. Lookups match boxes by a
/// [`MatchType`] rather than by exact key.
///
/// Geometry and overflow splitting are pluggable through the `G` and `S`
/// parameters.
///
/// # Example
///
/// ```rust
/// use mbr_tree::{MatchType, MbrTree, TreeConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tree = MbrTree::new(TreeConfig::new(4))?;
/// tree.add_box("park", 0.0, 0.0, 10.0, 10.0)?;
/// tree.add_point("bench", 3.0, 4.0)?;
///
/// let inside: Vec<_> = tree
///     .get_box(-1.0, -1.0, 5.0, 5.0, None, MatchType::Contains)
///     .map(|(value, _)| *value)
///     .collect();
/// assert_eq!(inside, vec!["bench"]);
///
/// assert_eq!(tree.delete_point(3.0, 4.0, None, MatchType::Equal)?, 1);
/// assert_eq!(tree.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MbrTree<V, G = Cartesian, S = LinearSplit> {
    root: Option<Node<V>>,
    /// Stored leaf entries
    size: usize,
    max_entries: usize,
    min_entries: usize,
    geometry: G,
    splitter: S,
}

/// What a removal below a node left behind for its parent to handle.
struct Removal<V> {
    /// The node the entry was removed from (or below) fell under `min_entries`
    underflow: bool,
    /// Entries of condensed nodes, waiting to be reinserted
    orphans: Vec<Entry<V>>,
}

/// Borrowed pieces of the tree needed while walking down a mutable path.
struct Placement<'t, G, S> {
    geometry: &'t G,
    splitter: &'t S,
    max_entries: usize,
    min_entries: usize,
    /// Tree extent including the entry being placed
    extent: BoundingBox,
}

type SplitPair<V> = (ChildEntry<V>, ChildEntry<V>);

impl<V> MbrTree<V> {
    /// Create an empty tree with Cartesian geometry and linear splitting.
    pub fn new(config: TreeConfig) -> TreeResult<Self> {
        Self::with_strategies(config, Cartesian, LinearSplit)
    }

    /// Build a tree from `(value, box)` pairs, inserted in Hilbert order.
    ///
    /// The result holds exactly the same entries as adding each pair with
    /// [`MbrTree::add`], but spatially close boxes arrive together, which
    /// gives tighter nodes than arbitrary input order.
    pub fn bulk_load<I>(config: TreeConfig, entries: I) -> TreeResult<Self>
    where
        I: IntoIterator<Item = (V, BoundingBox)>,
    {
        let mut tree = Self::new(config)?;
        tree.load(entries)?;
        Ok(tree)
    }
}

impl<V> Default for MbrTree<V> {
    fn default() -> Self {
        Self {
            root: None,
            size: 0,
            max_entries: DEFAULT_MAX_ENTRIES,
            min_entries: DEFAULT_MAX_ENTRIES / 2,
            geometry: Cartesian,
            splitter: LinearSplit,
        }
    }
}

impl<V, G, S> MbrTree<V, G, S>
where
    G: Geometry,
    S: SplitStrategy,
{
    /// Create an empty tree with the given geometry and split strategy.
    pub fn with_strategies(config: TreeConfig, geometry: G, splitter: S) -> TreeResult<Self> {
        config.validate()?;
        Ok(Self {
            root: None,
            size: 0,
            max_entries: config.max_entries,
            min_entries: config.min_entries(),
            geometry,
            splitter,
        })
    }

    /// The fan-out limits in effect.
    pub fn config(&self) -> TreeConfig {
        TreeConfig::new(self.max_entries).with_min_entries(self.min_entries)
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Number of stored entries.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Height of the root above the leaves, `None` for an empty tree.
    pub fn height(&self) -> Option<usize> {
        self.root.as_ref().map(Node::level)
    }

    /// Bounding box of everything stored, `None` for an empty tree.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.root
            .as_ref()
            .and_then(|root| root.compute_bbox(&self.geometry))
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.root = None;
        self.size = 0;
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Add `value` at a single point.
    pub fn add_point(&mut self, value: V, x: f64, y: f64) -> TreeResult<()> {
        let bbox = self.geometry.normalize(x, y, x, y);
        self.add_normalized(value, bbox)
    }

    /// Add `value` in the box spanned by two corners, given in any order.
    pub fn add_box(&mut self, value: V, x1: f64, y1: f64, x2: f64, y2: f64) -> TreeResult<()> {
        let bbox = self.geometry.normalize(x1, y1, x2, y2);
        self.add_normalized(value, bbox)
    }

    /// Add `value` in `bbox`, normalizing it first.
    pub fn add(&mut self, value: V, bbox: BoundingBox) -> TreeResult<()> {
        let bbox = self
            .geometry
            .normalize(bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y);
        self.add_normalized(value, bbox)
    }

    /// Add many entries, in Hilbert order of their box centers.
    pub fn load<I>(&mut self, entries: I) -> TreeResult<()>
    where
        I: IntoIterator<Item = (V, BoundingBox)>,
    {
        let entries: Vec<(V, BoundingBox)> = entries
            .into_iter()
            .map(|(value, b)| {
                let bbox = self.geometry.normalize(b.min_x, b.min_y, b.max_x, b.max_y);
                (value, bbox)
            })
            .collect();
        let Some(extent) = self.geometry.merge_all(entries.iter().map(|(_, bbox)| bbox)) else {
            return Ok(());
        };

        let order = HilbertOrder::new(extent);
        let mut keyed: Vec<(u64, V, BoundingBox)> = entries
            .into_iter()
            .map(|(value, bbox)| (order.key(&bbox), value, bbox))
            .collect();
        keyed.sort_by_key(|(key, _, _)| *key);

        let count = keyed.len();
        for (_, value, bbox) in keyed {
            self.add_normalized(value, bbox)?;
        }
        log::debug!(
            "Loaded {} entries, tree now holds {} at height {:?}",
            count,
            self.size,
            self.height()
        );
        Ok(())
    }

    fn add_normalized(&mut self, value: V, bbox: BoundingBox) -> TreeResult<()> {
        log::trace!("Adding entry at {}", bbox);
        self.insert_entry(Entry::Leaf(LeafEntry { bbox, value }))?;
        // counted here, not in insert_entry, so reinsertion is not counted
        self.size += 1;
        Ok(())
    }

    /// Place an entry in a node at its target height: leaf entries at height
    /// 0, subtrees one above their own root.
    fn insert_entry(&mut self, entry: Entry<V>) -> TreeResult<()> {
        let target = entry.target_level();
        let Some(root) = self.root.as_mut() else {
            return match entry {
                Entry::Leaf(leaf) => {
                    self.root = Some(Node::Leaf {
                        entries: vec![leaf],
                    });
                    Ok(())
                }
                Entry::Child(_) => {
                    log::error!("Cannot add node at height {} in empty tree", target);
                    Err(TreeError::HeightMismatch {
                        target,
                        height: None,
                    })
                }
            };
        };

        let height = root.level();
        if target > height {
            log::error!(
                "Cannot add node at height {} in tree of height {}",
                target,
                height
            );
            return Err(TreeError::HeightMismatch {
                target,
                height: Some(height),
            });
        }

        let extent = match root.compute_bbox(&self.geometry) {
            Some(bbox) => self.geometry.merge(&bbox, entry.bbox()),
            None => *entry.bbox(),
        };
        let placement = Placement {
            geometry: &self.geometry,
            splitter: &self.splitter,
            max_entries: self.max_entries,
            min_entries: self.min_entries,
            extent,
        };

        if let Some((first, second)) = placement.insert_into(root, entry, target)? {
            log::debug!("Root split, tree height {} -> {}", height, height + 1);
            self.root = Some(Node::Internal {
                children: vec![first, second],
                level: height + 1,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Entries matching the point `(x, y)`, as `(value, box)` pairs.
    ///
    /// With `value` set only entries holding an equal value are returned.
    pub fn get_point<'a>(
        &'a self,
        x: f64,
        y: f64,
        value: Option<&'a V>,
        match_type: MatchType,
    ) -> Query<'a, V, G> {
        let bbox = self.geometry.normalize(x, y, x, y);
        self.query(bbox, value, match_type)
    }

    /// Entries matching the box spanned by two corners, as `(value, box)` pairs.
    pub fn get_box<'a>(
        &'a self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        value: Option<&'a V>,
        match_type: MatchType,
    ) -> Query<'a, V, G> {
        let bbox = self.geometry.normalize(x1, y1, x2, y2);
        self.query(bbox, value, match_type)
    }

    /// Entries matching `bbox`, as `(value, box)` pairs.
    pub fn get<'a>(
        &'a self,
        bbox: &BoundingBox,
        value: Option<&'a V>,
        match_type: MatchType,
    ) -> Query<'a, V, G> {
        let bbox = self
            .geometry
            .normalize(bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y);
        self.query(bbox, value, match_type)
    }

    /// Every stored `(value, box)` pair.
    pub fn iter(&self) -> Query<'_, V, G> {
        let everything = BoundingBox::new(
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::INFINITY,
        );
        self.query(everything, None, MatchType::Intersect)
    }

    fn query<'a>(
        &'a self,
        bbox: BoundingBox,
        value: Option<&'a V>,
        match_type: MatchType,
    ) -> Query<'a, V, G> {
        Query::new(self.root.as_ref(), &self.geometry, bbox, value, match_type)
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Remove every entry [`MbrTree::get_point`] would return for the same
    /// arguments. Returns the number of entries removed.
    pub fn delete_point(
        &mut self,
        x: f64,
        y: f64,
        value: Option<&V>,
        match_type: MatchType,
    ) -> TreeResult<usize>
    where
        V: Clone + PartialEq,
    {
        let bbox = self.geometry.normalize(x, y, x, y);
        self.delete_normalized(bbox, value, match_type)
    }

    /// Remove every entry [`MbrTree::get_box`] would return for the same
    /// arguments. Returns the number of entries removed.
    pub fn delete_box(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        value: Option<&V>,
        match_type: MatchType,
    ) -> TreeResult<usize>
    where
        V: Clone + PartialEq,
    {
        let bbox = self.geometry.normalize(x1, y1, x2, y2);
        self.delete_normalized(bbox, value, match_type)
    }

    /// Remove every entry [`MbrTree::get`] would return for the same
    /// arguments. Returns the number of entries removed.
    pub fn delete(
        &mut self,
        bbox: &BoundingBox,
        value: Option<&V>,
        match_type: MatchType,
    ) -> TreeResult<usize>
    where
        V: Clone + PartialEq,
    {
        let bbox = self
            .geometry
            .normalize(bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y);
        self.delete_normalized(bbox, value, match_type)
    }

    fn delete_normalized(
        &mut self,
        bbox: BoundingBox,
        value: Option<&V>,
        match_type: MatchType,
    ) -> TreeResult<usize>
    where
        V: Clone + PartialEq,
    {
        let matches: Vec<(V, BoundingBox)> = self
            .query(bbox, value, match_type)
            .map(|(value, bbox)| (value.clone(), *bbox))
            .collect();

        for (value, bbox) in &matches {
            self.delete_one(bbox, value)?;
        }
        Ok(matches.len())
    }

    /// Remove one entry holding exactly `bbox` and `value`, then condense,
    /// reinsert orphans and collapse a single-child root.
    fn delete_one(&mut self, bbox: &BoundingBox, value: &V) -> TreeResult<()>
    where
        V: PartialEq,
    {
        log::trace!("Deleting entry at {}", bbox);
        let removal = match self.root.as_mut() {
            Some(root) => remove_from(&self.geometry, self.min_entries, root, bbox, value),
            None => None,
        };
        let Some(removal) = removal else {
            log::error!("Failed to delete matched entry at {}", bbox);
            return Err(TreeError::InternalConsistency(format!(
                "failed to delete matched entry at {}",
                bbox
            )));
        };
        self.size -= 1;

        // the root is exempt from the fan-out floor, but not from being empty
        if self.root.as_ref().is_some_and(Node::is_empty) {
            self.root = None;
        }
        if !removal.orphans.is_empty() {
            log::debug!("Reinserting {} orphaned entries", removal.orphans.len());
        }
        self.reinsert(removal.orphans)?;
        self.collapse_root();
        Ok(())
    }

    /// Reinsert entries of condensed nodes, whole subtrees where the tree is
    /// still tall enough, otherwise leaf by leaf.
    fn reinsert(&mut self, orphans: Vec<Entry<V>>) -> TreeResult<()> {
        for orphan in orphans {
            let height = self.height().unwrap_or(0);
            match orphan {
                Entry::Child(child) if child.node.level() + 1 > height => {
                    log::debug!(
                        "Orphan subtree at height {} exceeds tree height {}, reinserting its leaves",
                        child.node.level() + 1,
                        height
                    );
                    let mut leaves = Vec::new();
                    child.node.collect_leaves(&mut leaves);
                    for leaf in leaves {
                        self.insert_entry(Entry::Leaf(leaf))?;
                    }
                }
                orphan => self.insert_entry(orphan)?,
            }
        }
        Ok(())
    }

    /// Replace an internal root holding a single child by that child.
    fn collapse_root(&mut self) {
        if let Some(Node::Internal { children, level }) = &mut self.root {
            if children.len() == 1 {
                let level = *level;
                let only = children.swap_remove(0);
                log::debug!("Collapsing root, tree height {} -> {}", level, level - 1);
                self.root = Some(only.node);
            }
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// The tree in depth-first preorder, one row per entry, preceded by a
    /// synthetic row for the root box at the root height plus one.
    pub fn dump(&self) -> Vec<DumpEntry<'_, V>> {
        let mut rows = Vec::new();
        if let Some(root) = &self.root {
            if let Some(bbox) = root.compute_bbox(&self.geometry) {
                rows.push(DumpEntry {
                    height: root.level() + 1,
                    bbox,
                    value: None,
                });
            }
            dump_node(root, &mut rows);
        }
        rows
    }

    /// The dump as indented text, one row per line.
    pub fn to_debug_string(&self) -> String
    where
        V: Debug,
    {
        let top = self.height().map_or(0, |height| height + 1);
        let mut text = String::new();
        for row in self.dump() {
            let value = row.value.map(|v| format!(" {:?}", v)).unwrap_or_default();
            text.push_str(&format!(
                "{:2} {:indent$}{}{}\n",
                row.height,
                "",
                row.bbox,
                value,
                indent = 2 * (top - row.height)
            ));
        }
        text
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            total_entries: self.size,
            tree_height: self.height(),
            ..TreeStats::default()
        };
        if let Some(root) = &self.root {
            count_nodes(root, &mut stats);
        }
        stats
    }

    /// Verify the structural invariants: fan-out bounds (root exempt from the
    /// floor), tight boxes on every internal entry, consistent heights, and
    /// a leaf count equal to [`MbrTree::size`].
    ///
    /// Meant for tests and debugging; it walks the whole tree.
    pub fn assert_consistent(&self) -> TreeResult<()> {
        let counted = match &self.root {
            None => 0,
            Some(root) => {
                if root.is_empty() {
                    return Err(inconsistency(format!(
                        "empty root node at height {}",
                        root.level()
                    )));
                }
                self.check_node(root, true)?
            }
        };
        if counted != self.size {
            return Err(inconsistency(format!(
                "unexpected number of leaves ({} != {})",
                counted, self.size
            )));
        }
        Ok(())
    }

    fn check_node(&self, node: &Node<V>, is_root: bool) -> TreeResult<usize> {
        let height = node.level();
        if node.len() < self.min_entries && !is_root {
            return Err(inconsistency(format!(
                "too few children at height {} ({} < {})",
                height,
                node.len(),
                self.min_entries
            )));
        }
        if node.len() > self.max_entries {
            return Err(inconsistency(format!(
                "too many children at height {} ({} > {})",
                height,
                node.len(),
                self.max_entries
            )));
        }

        match node {
            Node::Leaf { entries } => Ok(entries.len()),
            Node::Internal { children, level } => {
                let mut count = 0;
                for child in children {
                    if child.node.level() + 1 != *level {
                        return Err(inconsistency(format!(
                            "child at height {} below node at height {}",
                            child.node.level(),
                            level
                        )));
                    }
                    let computed = child.node.compute_bbox(&self.geometry);
                    if computed != Some(child.bbox) {
                        return Err(inconsistency(format!(
                            "bad MBR at height {}: recorded {}, computed {:?}",
                            level, child.bbox, computed
                        )));
                    }
                    count += self.check_node(&child.node, false)?;
                }
                Ok(count)
            }
        }
    }
}

impl<'t, G, S> Placement<'t, G, S>
where
    G: Geometry,
    S: SplitStrategy,
{
    /// Insert below `node`, returning the two halves if `node` had to split.
    fn insert_into<V>(
        &self,
        node: &mut Node<V>,
        entry: Entry<V>,
        target: usize,
    ) -> TreeResult<Option<SplitPair<V>>> {
        match node {
            Node::Leaf { entries } => {
                let Entry::Leaf(leaf) = entry else {
                    return Err(self.misplaced(target, 0));
                };
                entries.push(leaf);
                if entries.len() > self.max_entries {
                    let overflowing = std::mem::take(entries);
                    return Ok(Some(self.split(overflowing, |entries| Node::Leaf { entries })));
                }
                Ok(None)
            }
            Node::Internal { children, level } => {
                let level = *level;
                if level == target {
                    let Entry::Child(child) = entry else {
                        return Err(self.misplaced(target, level));
                    };
                    children.push(child);
                } else {
                    let best = least_enlargement(
                        self.geometry,
                        children.iter().map(|c| (&c.bbox, c.node.len())),
                        entry.bbox(),
                        true,
                    )
                    .ok_or_else(|| {
                        inconsistency(format!("internal node at height {} has no children", level))
                    })?;

                    children[best.index].bbox = best.merged;
                    let split = self.insert_into(&mut children[best.index].node, entry, target)?;
                    let Some((first, second)) = split else {
                        return Ok(None);
                    };
                    children.remove(best.index);
                    children.push(first);
                    children.push(second);
                }

                if children.len() > self.max_entries {
                    let overflowing = std::mem::take(children);
                    return Ok(Some(self.split(overflowing, move |children| {
                        Node::Internal { children, level }
                    })));
                }
                Ok(None)
            }
        }
    }

    fn split<E, V, F>(&self, entries: Vec<E>, wrap: F) -> SplitPair<V>
    where
        E: SplitEntry,
        F: Fn(Vec<E>) -> Node<V>,
    {
        let (first, second) =
            self.splitter
                .split(self.geometry, entries, self.min_entries, &self.extent);
        (
            ChildEntry {
                bbox: first.bbox,
                node: wrap(first.entries),
            },
            ChildEntry {
                bbox: second.bbox,
                node: wrap(second.entries),
            },
        )
    }

    fn misplaced(&self, target: usize, level: usize) -> TreeError {
        inconsistency(format!(
            "entry for height {} reached a node at height {}",
            target, level
        ))
    }
}

/// Remove one exact `(bbox, value)` entry at or below `node`, descending only
/// into children whose box contains `bbox`. Children that fall under
/// `min_entries` are cut out and their entries returned as orphans; surviving
/// children on the path get their box recomputed. `None` if nothing matched.
fn remove_from<V, G>(
    geometry: &G,
    min_entries: usize,
    node: &mut Node<V>,
    bbox: &BoundingBox,
    value: &V,
) -> Option<Removal<V>>
where
    V: PartialEq,
    G: Geometry,
{
    match node {
        Node::Leaf { entries } => {
            let position = entries
                .iter()
                .position(|e| e.bbox == *bbox && e.value == *value)?;
            entries.remove(position);
            Some(Removal {
                underflow: entries.len() < min_entries,
                orphans: Vec::new(),
            })
        }
        Node::Internal { children, .. } => {
            for index in 0..children.len() {
                if !geometry.contains(&children[index].bbox, bbox) {
                    continue;
                }
                let Some(mut removal) =
                    remove_from(geometry, min_entries, &mut children[index].node, bbox, value)
                else {
                    continue;
                };

                if removal.underflow {
                    let condensed = children.remove(index);
                    log::trace!(
                        "Condensing node at height {} with {} entries",
                        condensed.node.level(),
                        condensed.node.len()
                    );
                    removal.orphans.extend(condensed.node.into_entries());
                } else if let Some(tight) = children[index].node.compute_bbox(geometry) {
                    children[index].bbox = tight;
                }
                removal.underflow = children.len() < min_entries;
                return Some(removal);
            }
            None
        }
    }
}

fn dump_node<'a, V>(node: &'a Node<V>, rows: &mut Vec<DumpEntry<'a, V>>) {
    match node {
        Node::Leaf { entries } => {
            for entry in entries {
                rows.push(DumpEntry {
                    height: 0,
                    bbox: entry.bbox,
                    value: Some(&entry.value),
                });
            }
        }
        Node::Internal { children, level } => {
            for child in children {
                rows.push(DumpEntry {
                    height: *level,
                    bbox: child.bbox,
                    value: None,
                });
                dump_node(&child.node, rows);
            }
        }
    }
}

fn count_nodes<V>(node: &Node<V>, stats: &mut TreeStats) {
    stats.node_count += 1;
    match node {
        Node::Leaf { .. } => stats.leaf_count += 1,
        Node::Internal { children, .. } => {
            for child in children {
                count_nodes(&child.node, stats);
            }
        }
    }
}

fn inconsistency(message: String) -> TreeError {
    log::error!("Tree inconsistency: {}", message);
    TreeError::InternalConsistency(message)
}
