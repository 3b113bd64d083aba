//! PresentationLayer - callback interface for engine bridges.
//!
//! This trait allows the streaming engine to notify engine-specific code
//! (Bevy, Unity, Godot) about chunk visibility events without depending on
//! any specific engine. Events are replayed from a [`crate::TickOutput`] with
//! [`crate::TickOutput::present`].

use crate::octree::ChunkLocation;
use crate::world::VolumeId;

/// Callback interface for engine bridges.
///
/// Must be thread-safe as hosts may replay ticks from worker threads.
///
/// # Example (Bevy)
///
/// ```ignore
/// struct BevyPresentation {
///     chunks: Mutex<ChunkEntities>,
/// }
///
/// impl PresentationLayer for BevyPresentation {
///     fn on_block_activate(&self, volume_id: VolumeId, location: ChunkLocation) {
///         self.chunks.lock().show(volume_id, location);
///     }
///     // ...
/// }
/// ```
pub trait PresentationLayer: Send + Sync {
  /// A mesh chunk was chosen for display.
  fn on_block_activate(&self, volume_id: VolumeId, location: ChunkLocation);

  /// A mesh chunk is replaced by its parent or its children.
  fn on_block_deactivate(&self, volume_id: VolumeId, location: ChunkLocation);

  /// A mesh chunk left every viewer's range; its resources can be freed.
  fn on_mesh_unload(&self, volume_id: VolumeId, location: ChunkLocation);

  /// Faces of an active chunk bordering coarser chunks changed.
  ///
  /// Bit order: -X, +X, -Y, +Y, -Z, +Z.
  fn on_transition_mask(&self, volume_id: VolumeId, location: ChunkLocation, mask: u8);
}

/// No-op implementation for testing and headless operation.
pub struct NullPresentation;

impl PresentationLayer for NullPresentation {
  fn on_block_activate(&self, _volume_id: VolumeId, _location: ChunkLocation) {
    // No-op
  }

  fn on_block_deactivate(&self, _volume_id: VolumeId, _location: ChunkLocation) {
    // No-op
  }

  fn on_mesh_unload(&self, _volume_id: VolumeId, _location: ChunkLocation) {
    // No-op
  }

  fn on_transition_mask(&self, _volume_id: VolumeId, _location: ChunkLocation, _mask: u8) {
    // No-op
  }
}
