//! TickOutput - work produced by one streaming tick.

use crate::metrics::TickStats;
use crate::octree::{ChunkLocation, TransitionMaskUpdate, VisibilityChange};
use crate::presentation::PresentationLayer;
use crate::world::VolumeId;

/// Everything the host has to act on after a tick.
///
/// Lists are in the order the engine produced them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickOutput {
  /// Data chunks to load. Post each with
  /// [`crate::CompletionSender::data_block_loaded`] when it arrives.
  pub data_blocks_to_load: Vec<ChunkLocation>,
  /// Unloaded data chunks that were modified and must be persisted.
  pub data_blocks_to_save: Vec<ChunkLocation>,
  /// Resident data chunks whose last viewer left.
  pub data_blocks_unloaded: Vec<ChunkLocation>,
  /// Loads requested in earlier ticks that nobody wants anymore.
  pub data_loads_cancelled: Vec<ChunkLocation>,
  /// Mesh chunks to build. Post each with
  /// [`crate::CompletionSender::mesh_block_loaded`] when done.
  pub mesh_blocks_to_update: Vec<ChunkLocation>,
  /// Mesh chunks out of every viewer's range.
  pub mesh_blocks_to_unload: Vec<ChunkLocation>,
  pub visibility_changes: Vec<VisibilityChange>,
  /// LODs whose transition masks were refreshed (bit per LOD).
  pub transition_lods_mask: u32,
  pub transition_mask_updates: Vec<TransitionMaskUpdate>,
  pub stats: TickStats,
}

impl TickOutput {
  /// True when the tick produced no work at all.
  pub fn is_idle(&self) -> bool {
    self.data_blocks_to_load.is_empty()
      && self.data_blocks_to_save.is_empty()
      && self.data_blocks_unloaded.is_empty()
      && self.data_loads_cancelled.is_empty()
      && self.mesh_blocks_to_update.is_empty()
      && self.mesh_blocks_to_unload.is_empty()
      && self.visibility_changes.is_empty()
      && self.transition_mask_updates.is_empty()
  }

  /// Replay presentation events into `layer`: mesh unloads, then visibility
  /// changes in order, then transition masks.
  pub fn present(&self, volume_id: VolumeId, layer: &dyn PresentationLayer) {
    for location in &self.mesh_blocks_to_unload {
      layer.on_mesh_unload(volume_id, *location);
    }
    for change in &self.visibility_changes {
      match *change {
        VisibilityChange::Activate(location) => layer.on_block_activate(volume_id, location),
        VisibilityChange::Deactivate(location) => layer.on_block_deactivate(volume_id, location),
      }
    }
    for update in &self.transition_mask_updates {
      layer.on_transition_mask(volume_id, update.location, update.mask);
    }
  }
}
