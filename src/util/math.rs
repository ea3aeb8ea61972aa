//! Math type re-exports and small geometric helpers.
//!
//! Positions and vector-valued parameters are double precision throughout,
//! so only the `f64` flavours of `glam` are re-exported.

pub use glam::{DMat3, DVec3};

use std::fmt;

/// Arithmetic mean of a set of points. Returns zero for an empty set.
#[inline]
pub fn centroid(points: impl IntoIterator<Item = DVec3>) -> DVec3 {
    let mut sum = DVec3::ZERO;
    let mut n = 0usize;
    for p in points {
        sum += p;
        n += 1;
    }
    if n == 0 {
        DVec3::ZERO
    } else {
        sum / n as f64
    }
}

/// Midpoint of a segment.
#[inline]
pub fn midpoint(a: DVec3, b: DVec3) -> DVec3 {
    (a + b) * 0.5
}

/// 3D bounding box with double precision.
#[derive(Clone, Copy, PartialEq)]
pub struct BBox3d {
    pub min: DVec3,
    pub max: DVec3,
}

impl BBox3d {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: DVec3::splat(f64::INFINITY),
        max: DVec3::splat(f64::NEG_INFINITY),
    };

    /// Check if this box is empty (has no volume).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: DVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Get the center of the box.
    #[inline]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size (extents) of the box.
    #[inline]
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }
}

impl Default for BBox3d {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for BBox3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox3d({:?} - {:?})", self.min, self.max)
    }
}

impl FromIterator<DVec3> for BBox3d {
    fn from_iter<I: IntoIterator<Item = DVec3>>(iter: I) -> Self {
        let mut b = Self::EMPTY;
        for p in iter {
            b.expand_by_point(p);
        }
        b
    }
}
