//! Error types for clipbox streaming.

use thiserror::Error;

use crate::constants::{MAX_LOD_COUNT, MAX_MESH_BLOCK_SIZE_PO2, MIN_MESH_BLOCK_SIZE_PO2};

/// Configuration errors reported by [`crate::ClipboxStreaming`].
///
/// Internal invariant violations are not represented here; they panic.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StreamingError {
  #[error(
    "mesh block size 2^{0} is outside 2^{min}..=2^{max}",
    min = MIN_MESH_BLOCK_SIZE_PO2,
    max = MAX_MESH_BLOCK_SIZE_PO2
  )]
  InvalidMeshBlockSize(u32),

  #[error("mesh block size 2^{mesh_po2} is smaller than data block size 2^{data_po2}")]
  MeshBlockSmallerThanData { mesh_po2: u32, data_po2: u32 },

  #[error("lod count {0} is outside 1..={max}", max = MAX_LOD_COUNT)]
  InvalidLodCount(usize),

  #[error("lod distance must be positive and finite, got {0}")]
  InvalidLodDistance(f32),

  #[error("lod count changed from {previous} to {current} while streaming")]
  LodCountChanged { previous: usize, current: usize },
}
