//! Streaming layout constants.
//!
//! # Chunk Grids
//!
//! ```text
//! LOD 0 mesh chunk = 2^mesh_block_size_po2 voxels per axis
//! LOD L mesh chunk = 2^(mesh_block_size_po2 + L) LOD-0 voxels per axis
//!
//!   LOD 1   ┌───────────┬───────────┐
//!           │     0     │     1     │
//!   LOD 0   ├─────┬─────┼─────┬─────┤
//!           │  0  │  1  │  2  │  3  │
//!           └─────┴─────┴─────┴─────┘
//!   parent = child >> 1, child = parent * 2 + octant
//! ```
//!
//! Below the root every box has even bounds so that each coarse chunk maps to
//! exactly 8 fine chunks.

use glam::IVec3;

/// Maximum number of LOD levels a volume can have.
pub const MAX_LOD_COUNT: usize = 24;

/// Minimum distance in chunks between the boundary of a LOD box and the
/// boundary of the next finer LOD box inside it.
pub const MIN_NEIGHBOR_PADDING: i32 = 2;

/// Smallest allowed mesh block size (power of two exponent).
pub const MIN_MESH_BLOCK_SIZE_PO2: u32 = 3;

/// Largest allowed mesh block size (power of two exponent).
pub const MAX_MESH_BLOCK_SIZE_PO2: u32 = 6;

/// Number of children of a chunk.
pub const OCTANT_COUNT: usize = 8;

/// Face neighbor offsets, in transition mask bit order.
///
/// Bit order: -X, +X, -Y, +Y, -Z, +Z.
pub const FACE_OFFSETS: [IVec3; 6] = [
  IVec3::new(-1, 0, 0),
  IVec3::new(1, 0, 0),
  IVec3::new(0, -1, 0),
  IVec3::new(0, 1, 0),
  IVec3::new(0, 0, -1),
  IVec3::new(0, 0, 1),
];

/// Get the child offset of an octant.
///
/// Bits: 0 = X, 1 = Y, 2 = Z.
#[inline]
pub const fn octant_offset(octant: u8) -> IVec3 {
  IVec3::new(
    (octant & 1) as i32,
    ((octant >> 1) & 1) as i32,
    ((octant >> 2) & 1) as i32,
  )
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
