//! Coordinate-system predicates used by the tree.
//!
//! The tree never inspects box coordinates directly; every comparison goes
//! through a [`Geometry`]. [`Cartesian`] is the planar implementation. Other
//! coordinate systems (a geographic one that wraps at the antimeridian, say)
//! plug in by implementing the same five operations.

use std::fmt::Debug;

use crate::bounding_box::BoundingBox;

/// The capability set the tree engine and split strategies depend on.
///
/// All operations are pure.
pub trait Geometry: Debug {
    /// Builds a canonical box from two arbitrary corners. A point is passed as
    /// `x1 == x2`, `y1 == y2`.
    ///
    /// Coordinates are not validated. [`Cartesian`] follows `f64::min` and
    /// `f64::max`, so a NaN coordinate is replaced by the other corner's value
    /// on that axis.
    fn normalize(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> BoundingBox;

    /// True if the closed rectangles overlap on both axes.
    fn intersects(&self, a: &BoundingBox, b: &BoundingBox) -> bool;

    /// True if `inner` lies entirely within `outer`, boundaries included.
    fn contains(&self, outer: &BoundingBox, inner: &BoundingBox) -> bool;

    /// Non-negative area; zero for degenerate boxes.
    fn area(&self, bbox: &BoundingBox) -> f64;

    /// Smallest box enclosing both arguments.
    fn merge(&self, a: &BoundingBox, b: &BoundingBox) -> BoundingBox;

    /// Merge over a sequence of boxes, `None` when it is empty.
    fn merge_all<'a, I>(&self, boxes: I) -> Option<BoundingBox>
    where
        I: IntoIterator<Item = &'a BoundingBox>,
        Self: Sized,
    {
        boxes.into_iter().fold(None, |total, bbox| match total {
            None => Some(*bbox),
            Some(total) => Some(self.merge(&total, bbox)),
        })
    }
}

/// Planar x/y geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cartesian;

impl Geometry for Cartesian {
    fn normalize(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> BoundingBox {
        BoundingBox::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
    }

    fn intersects(&self, a: &BoundingBox, b: &BoundingBox) -> bool {
        a.intersects(b)
    }

    fn contains(&self, outer: &BoundingBox, inner: &BoundingBox) -> bool {
        outer.contains(inner)
    }

    fn area(&self, bbox: &BoundingBox) -> f64 {
        bbox.area()
    }

    fn merge(&self, a: &BoundingBox, b: &BoundingBox) -> BoundingBox {
        a.union(b)
    }
}
