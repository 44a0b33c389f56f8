//! Lazy query iteration.

use std::iter::FusedIterator;
use std::slice;

use crate::bounding_box::BoundingBox;
use crate::geometry::Geometry;

use super::tree_types::{ChildEntry, LeafEntry, MatchType, Node};

/// Iterator over the `(value, box)` pairs matching a query.
///
/// The walk is depth first and pull based: nothing beyond the current path is
/// visited until the next item is requested, so dropping the iterator early
/// cancels the query. It borrows the tree, which therefore cannot be modified
/// while the iterator is alive.
pub struct Query<'a, V, G> {
    geometry: &'a G,
    bbox: BoundingBox,
    value: Option<&'a V>,
    match_type: MatchType,
    /// Internal nodes being walked, innermost last
    stack: Vec<slice::Iter<'a, ChildEntry<V>>>,
    leaf: Option<slice::Iter<'a, LeafEntry<V>>>,
}

impl<'a, V, G> Query<'a, V, G> {
    pub(crate) fn new(
        root: Option<&'a Node<V>>,
        geometry: &'a G,
        bbox: BoundingBox,
        value: Option<&'a V>,
        match_type: MatchType,
    ) -> Self {
        let mut query = Self {
            geometry,
            bbox,
            value,
            match_type,
            stack: Vec::new(),
            leaf: None,
        };
        match root {
            Some(Node::Leaf { entries }) => query.leaf = Some(entries.iter()),
            Some(Node::Internal { children, .. }) => query.stack.push(children.iter()),
            None => {}
        }
        query
    }

    /// The normalized query box.
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }
}

impl<'a, V, G> Iterator for Query<'a, V, G>
where
    V: PartialEq,
    G: Geometry,
{
    type Item = (&'a V, &'a BoundingBox);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(leaf) = self.leaf.as_mut() {
                for entry in leaf.by_ref() {
                    if self.value.is_some_and(|value| *value != entry.value) {
                        continue;
                    }
                    if self.match_type.accepts(self.geometry, &self.bbox, &entry.bbox) {
                        return Some((&entry.value, &entry.bbox));
                    }
                }
                self.leaf = None;
            }

            let frame = self.stack.last_mut()?;
            match frame.next() {
                None => {
                    self.stack.pop();
                }
                Some(child) => {
                    if !self.match_type.may_descend(self.geometry, &self.bbox, &child.bbox) {
                        continue;
                    }
                    match &child.node {
                        Node::Leaf { entries } => self.leaf = Some(entries.iter()),
                        Node::Internal { children, .. } => self.stack.push(children.iter()),
                    }
                }
            }
        }
    }
}

impl<V: PartialEq, G: Geometry> FusedIterator for Query<'_, V, G> {}
