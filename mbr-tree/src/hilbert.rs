//! Hilbert curve ordering for bulk loading.
//!
//! The Hilbert curve maps 2D coordinates to a 1D index while preserving
//! spatial locality. Inserting entries in curve order keeps neighbouring boxes
//! together, so the greedy insertion path builds tighter nodes than it would
//! from arbitrary input order.

use crate::bounding_box::BoundingBox;

/// Curve order used for bulk loading (a 65536 x 65536 grid)
pub const DEFAULT_ORDER: u32 = 16;

/// Maximum order for Hilbert curve encoding (determines precision)
const MAX_HILBERT_ORDER: u32 = 31;

/// Assigns Hilbert indices to boxes by their center, relative to a fixed extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HilbertOrder {
    extent: BoundingBox,
    order: u32,
}

impl HilbertOrder {
    /// An ordering over `extent` at [`DEFAULT_ORDER`].
    pub fn new(extent: BoundingBox) -> Self {
        Self::with_order(extent, DEFAULT_ORDER)
    }

    /// An ordering over `extent` at the given curve order, clamped to `1..=31`.
    pub fn with_order(extent: BoundingBox, order: u32) -> Self {
        Self {
            extent,
            order: order.clamp(1, MAX_HILBERT_ORDER),
        }
    }

    /// Hilbert index of the box center. Centers outside the extent are clamped
    /// to its border; a zero-width axis maps to the middle of the grid.
    pub fn key(&self, bbox: &BoundingBox) -> u64 {
        let (x, y) = bbox.center();
        let x_norm = normalize(x, self.extent.min_x, self.extent.width());
        let y_norm = normalize(y, self.extent.min_y, self.extent.height());
        hilbert_index(x_norm, y_norm, self.order)
    }
}

fn normalize(value: f64, min: f64, range: f64) -> f64 {
    if range > 0.0 {
        ((value - min) / range).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// Encodes coordinates normalized to [0, 1] to a Hilbert curve index.
fn hilbert_index(x: f64, y: f64, order: u32) -> u64 {
    // Convert normalized coordinates to discrete grid coordinates
    let n = 1u64 << order;
    let xi = ((x * (n as f64 - 0.5)) as u64).min(n - 1);
    let yi = ((y * (n as f64 - 0.5)) as u64).min(n - 1);

    xy2d(n, xi, yi)
}

/// Converts grid coordinates on an `n` x `n` Hilbert curve to the distance
/// along it (standard rotate-and-reflect formulation).
fn xy2d(n: u64, mut x: u64, mut y: u64) -> u64 {
    let mut d = 0u64;
    let mut s = n / 2;

    while s > 0 {
        let rx = ((x & s) > 0) as u64;
        let ry = ((y & s) > 0) as u64;
        d += s * s * ((3 * rx) ^ ry);
        if ry == 0 {
            if rx == 1 {
                x = s.wrapping_sub(1).wrapping_sub(x);
                y = s.wrapping_sub(1).wrapping_sub(y);
            }
            std::mem::swap(&mut x, &mut y);
        }
        s /= 2;
    }

    d
}
