//! Box3i - integer axis-aligned box in chunk-grid units.
//!
//! Boxes are half-open: `position` is the first covered cell and
//! `position + size` is one past the last. Every box belongs to the chunk grid
//! of one LOD; the same integer box at LOD `L` covers `2^L` times the volume
//! it covers at LOD 0.

use glam::IVec3;
use smallvec::SmallVec;

/// Integer axis-aligned box.
///
/// A box with any size component `<= 0` is empty and behaves as "nothing":
/// it intersects nothing and is contained in everything.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Box3i {
  /// Minimum corner (inclusive).
  pub position: IVec3,
  /// Extent along each axis, never negative.
  pub size: IVec3,
}

/// Floor division of each component by a positive divisor.
#[inline]
pub fn floor_div(v: IVec3, divisor: i32) -> IVec3 {
  debug_assert!(divisor > 0);
  IVec3::new(
    v.x.div_euclid(divisor),
    v.y.div_euclid(divisor),
    v.z.div_euclid(divisor),
  )
}

/// Ceiling division of each component by a positive divisor.
#[inline]
pub fn ceil_div(v: IVec3, divisor: i32) -> IVec3 {
  -floor_div(-v, divisor)
}

impl Box3i {
  /// The canonical empty box.
  pub const EMPTY: Self = Self {
    position: IVec3::ZERO,
    size: IVec3::ZERO,
  };

  /// Create a box from its minimum corner and size.
  pub fn new(position: IVec3, size: IVec3) -> Self {
    debug_assert!(
      size.cmpge(IVec3::ZERO).all(),
      "Box3i size must be >= 0 on all axes, got {size}"
    );
    Self { position, size }
  }

  /// Create a box from an inclusive minimum and an exclusive maximum.
  ///
  /// Inverted axes collapse to a zero size.
  pub fn from_min_max(min: IVec3, max: IVec3) -> Self {
    Self {
      position: min,
      size: (max - min).max(IVec3::ZERO),
    }
  }

  #[inline]
  pub fn min(&self) -> IVec3 {
    self.position
  }

  /// Exclusive maximum corner.
  #[inline]
  pub fn max(&self) -> IVec3 {
    self.position + self.size
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.size.cmple(IVec3::ZERO).any()
  }

  /// Number of cells covered.
  pub fn volume(&self) -> i64 {
    if self.is_empty() {
      return 0;
    }
    self.size.x as i64 * self.size.y as i64 * self.size.z as i64
  }

  /// True when both boxes share at least one cell.
  #[inline]
  pub fn intersects(&self, other: &Box3i) -> bool {
    !self.is_empty()
      && !other.is_empty()
      && self.min().cmplt(other.max()).all()
      && other.min().cmplt(self.max()).all()
  }

  /// True when every cell of `other` is inside this box.
  #[inline]
  pub fn contains(&self, other: &Box3i) -> bool {
    if other.is_empty() {
      return true;
    }
    !self.is_empty()
      && other.min().cmpge(self.min()).all()
      && other.max().cmple(self.max()).all()
  }

  #[inline]
  pub fn contains_point(&self, point: IVec3) -> bool {
    point.cmpge(self.min()).all() && point.cmplt(self.max()).all()
  }

  pub fn intersection(&self, other: &Box3i) -> Box3i {
    Box3i::from_min_max(self.min().max(other.min()), self.max().min(other.max()))
  }

  /// Restrict this box to `bounds`.
  pub fn clip(&mut self, bounds: &Box3i) {
    *self = self.intersection(bounds);
  }

  pub fn clipped(&self, bounds: &Box3i) -> Box3i {
    self.intersection(bounds)
  }

  /// Grow by `amount` cells on every side. Negative amounts shrink.
  pub fn padded(&self, amount: i32) -> Box3i {
    let pad = IVec3::splat(amount);
    Box3i::from_min_max(self.min() - pad, self.max() + pad)
  }

  pub fn scaled(&self, factor: i32) -> Box3i {
    Box3i::new(self.position * factor, self.size * factor)
  }

  /// Convert to a grid `factor` times coarser, covering every cell that
  /// touches this box.
  pub fn downscaled(&self, factor: i32) -> Box3i {
    Box3i::from_min_max(floor_div(self.min(), factor), ceil_div(self.max(), factor))
  }

  /// Convert to a grid `factor` times coarser, keeping only the cells this box
  /// covers completely.
  pub fn downscaled_inner(&self, factor: i32) -> Box3i {
    Box3i::from_min_max(ceil_div(self.min(), factor), floor_div(self.max(), factor))
  }

  /// The same box in the next coarser LOD grid (`pos >> 1`, `size >> 1`).
  ///
  /// Exact only for boxes with even position and size.
  pub fn halved(&self) -> Box3i {
    Box3i::new(self.position >> 1, self.size >> 1)
  }

  /// Grow this box to the bounding box of itself and `other`.
  pub fn merge_with(&mut self, other: &Box3i) {
    if other.is_empty() {
      return;
    }
    if self.is_empty() {
      *self = *other;
      return;
    }
    *self = Box3i::from_min_max(self.min().min(other.min()), self.max().max(other.max()));
  }

  /// Iterate every cell, X innermost.
  pub fn cells(&self) -> impl Iterator<Item = IVec3> {
    let min = self.min();
    let max = self.max();
    (min.z..max.z).flat_map(move |z| {
      (min.y..max.y).flat_map(move |y| (min.x..max.x).map(move |x| IVec3::new(x, y, z)))
    })
  }

  /// Decompose `self \ other` into at most 6 disjoint boxes.
  ///
  /// Slabs are cut off axis by axis (X, then Y, then Z). After each cut the
  /// remainder shrinks to the overlap on that axis, so emitted boxes never
  /// overlap and together cover exactly the cells of `self` outside `other`.
  pub fn difference(&self, other: &Box3i, mut visitor: impl FnMut(Box3i)) {
    if self.is_empty() {
      return;
    }
    if !self.intersects(other) {
      visitor(*self);
      return;
    }

    let mut min = self.min();
    let mut max = self.max();
    let other_min = other.min();
    let other_max = other.max();

    for axis in 0..3 {
      if other_min[axis] > min[axis] {
        let mut slab_max = max;
        slab_max[axis] = other_min[axis];
        visitor(Box3i::from_min_max(min, slab_max));
        min[axis] = other_min[axis];
      }
      if other_max[axis] < max[axis] {
        let mut slab_min = min;
        slab_min[axis] = other_max[axis];
        visitor(Box3i::from_min_max(slab_min, max));
        max[axis] = other_max[axis];
      }
    }
  }

  /// Collect [`Box3i::difference`] into a buffer.
  pub fn difference_boxes(&self, other: &Box3i) -> SmallVec<[Box3i; 6]> {
    let mut boxes = SmallVec::new();
    self.difference(other, |b| boxes.push(b));
    boxes
  }
}

#[cfg(test)]
#[path = "box3i_test.rs"]
mod box3i_test;
