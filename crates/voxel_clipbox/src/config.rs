//! StreamingSettings - per-volume streaming configuration.

use crate::constants::{MAX_MESH_BLOCK_SIZE_PO2, MIN_MESH_BLOCK_SIZE_PO2};
use crate::error::StreamingError;

/// Streaming configuration for one volume.
///
/// Data block size, LOD count and bounds belong to the data store; these
/// settings cover what the streaming engine itself decides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamingSettings {
  /// Mesh chunk edge length at LOD 0, as a power of two (in voxels).
  pub mesh_block_size_po2: u32,

  /// Distance in voxels a viewer keeps each LOD at full detail before
  /// switching to the next coarser one.
  pub lod_distance: f32,

  /// Upper bound on any viewer's view distance, in volume-local voxels.
  pub view_distance_voxels: i32,

  /// Recompute transition masks after visibility changes.
  pub enable_transition_updates: bool,
}

impl StreamingSettings {
  /// Default streaming configuration.
  pub const DEFAULT: Self = Self {
    mesh_block_size_po2: 4,
    lod_distance: 48.0,
    view_distance_voxels: 512,
    enable_transition_updates: true,
  };

  /// Mesh chunk edge length at LOD 0 in voxels.
  #[inline]
  pub fn mesh_block_size(&self) -> i32 {
    1 << self.mesh_block_size_po2
  }

  /// Number of chunks kept around a viewer at every LOD except the last.
  pub fn lod_distance_in_chunks(&self) -> i32 {
    (self.lod_distance.ceil() as i32 / self.mesh_block_size()).max(1)
  }

  /// Check the settings on their own.
  pub fn validate(&self) -> Result<(), StreamingError> {
    if !(MIN_MESH_BLOCK_SIZE_PO2..=MAX_MESH_BLOCK_SIZE_PO2).contains(&self.mesh_block_size_po2) {
      return Err(StreamingError::InvalidMeshBlockSize(self.mesh_block_size_po2));
    }
    if !self.lod_distance.is_finite() || self.lod_distance <= 0.0 {
      return Err(StreamingError::InvalidLodDistance(self.lod_distance));
    }
    Ok(())
  }
}

impl Default for StreamingSettings {
  fn default() -> Self {
    Self::DEFAULT
  }
}
