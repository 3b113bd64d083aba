//! ChunkLocation - immutable value type identifying a chunk in the LOD pyramid.
//!
//! Positions are in the grid of the chunk's own LOD. LOD 0 = finest detail,
//! `lod_count - 1` = root. Parent and child positions are derived with shifts,
//! so no explicit tree is stored.

use glam::IVec3;

use crate::constants::{octant_offset, OCTANT_COUNT};

/// Chunk position plus LOD.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChunkLocation {
  /// Grid position at this chunk's LOD level
  pub position: IVec3,
  /// Level of detail (0 = finest, higher = coarser)
  pub lod: u8,
}

impl ChunkLocation {
  pub fn new(position: IVec3, lod: u8) -> Self {
    Self { position, lod }
  }

  /// All 8 children (finer detail: LOD - 1), or None at LOD 0.
  ///
  /// Index bits are the +X, +Y, +Z offsets (bit 0 = X).
  pub fn children(&self) -> Option<[Self; OCTANT_COUNT]> {
    if self.lod == 0 {
      return None;
    }
    let base = self.first_child_position();
    let lod = self.lod - 1;
    Some(std::array::from_fn(|octant| Self {
      position: base + octant_offset(octant as u8),
      lod,
    }))
  }

  /// Position of octant 0 in the child grid.
  #[inline]
  pub fn first_child_position(&self) -> IVec3 {
    self.position << 1
  }

  /// Get parent chunk (coarser: LOD + 1).
  ///
  /// Returns None at the root LOD (`lod_count - 1`).
  pub fn get_parent(&self, lod_count: usize) -> Option<Self> {
    if self.lod as usize + 1 >= lod_count {
      return None;
    }
    Some(Self {
      position: self.position >> 1,
      lod: self.lod + 1,
    })
  }

  /// The 8 chunks sharing this chunk's parent, self included.
  pub fn siblings(&self) -> [Self; OCTANT_COUNT] {
    let base = (self.position >> 1) << 1;
    std::array::from_fn(|octant| Self {
      position: base + octant_offset(octant as u8),
      lod: self.lod,
    })
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
