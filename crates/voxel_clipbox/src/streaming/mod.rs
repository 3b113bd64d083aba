//! ClipboxStreaming - per-volume streaming engine.
//!
//! One [`ClipboxStreaming::process`] call per tick:
//!
//! 1. Pair viewers and compute their boxes.
//! 2. Diff data boxes: view, unview and request data chunks.
//! 3. Diff mesh boxes: create and erase mesh records.
//! 4. Drain data completions and queue mesh updates.
//! 5. Drain mesh completions and update visibility and transition masks.
//! 6. Hand queued mesh updates to the host.

mod data_window;
mod loaded;
mod mesh_window;
mod output;

pub use output::TickOutput;

use std::collections::HashMap;
use std::sync::Arc;

use glam::{DAffine3, IVec3};
use parking_lot::RwLock;
use web_time::Instant;

use crate::boxes::{compute_viewer_boxes, BoxLayout};
use crate::config::StreamingSettings;
use crate::constants::MAX_LOD_COUNT;
use crate::data_store::VoxelDataStore;
use crate::error::StreamingError;
use crate::mailbox::{CompletionMailbox, CompletionSender};
use crate::metrics::StreamingMetrics;
use crate::octree::ChunkLocation;
use crate::types::{LoadingDataBlock, MeshBlockState, MeshMap, MeshState};
use crate::viewer::{pair_viewers, remove_unpaired_viewers, PairedViewer, Viewer, ViewerId};
use crate::world::StreamedVolume;

/// Streaming state of one LOD.
#[derive(Default)]
pub(crate) struct LodState {
  /// Shared with readers (renderers, tools) outside the tick.
  pub(crate) mesh_map: Arc<RwLock<MeshMap>>,
  /// Requested data chunks that have not arrived yet.
  pub(crate) loading_blocks: HashMap<IVec3, LoadingDataBlock>,
  /// Mesh chunks queued for an update, in queue order.
  pub(crate) mesh_blocks_pending_update: Vec<IVec3>,
}

/// Clipbox streaming engine for one volume.
pub struct ClipboxStreaming {
  settings: StreamingSettings,
  volume: StreamedVolume,
  paired_viewers: Vec<PairedViewer>,
  /// Sized from the data store on the first tick.
  lods: Vec<LodState>,
  mailbox: CompletionMailbox,
  metrics: StreamingMetrics,
}

impl ClipboxStreaming {
  pub fn new(settings: StreamingSettings) -> Result<Self, StreamingError> {
    Self::with_volume(settings, StreamedVolume::new())
  }

  pub fn with_volume(settings: StreamingSettings, volume: StreamedVolume) -> Result<Self, StreamingError> {
    settings.validate()?;
    Ok(Self {
      settings,
      volume,
      paired_viewers: Vec::new(),
      lods: Vec::new(),
      mailbox: CompletionMailbox::new(),
      metrics: StreamingMetrics::new(),
    })
  }

  /// Move the volume. Boxes follow on the next tick.
  pub fn set_volume_transform(&mut self, transform: DAffine3) {
    self.volume.set_transform(transform);
  }

  /// Run one streaming tick.
  ///
  /// `can_load` pauses new data and mesh chunk creation, `can_mesh` pauses
  /// handing out mesh updates. Neither loses work: it resumes on the next
  /// tick that allows it.
  #[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "streaming::process"))]
  pub fn process<S: VoxelDataStore>(
    &mut self,
    viewers: &[Viewer],
    store: &mut S,
    can_load: bool,
    can_mesh: bool,
  ) -> Result<TickOutput, StreamingError> {
    let start = Instant::now();
    let layout = self.prepare_lods(&*store)?;
    let mut output = TickOutput::default();

    let unpaired = {
      let _span = tracing::info_span!("process_viewers").entered();
      let unpaired = pair_viewers(&mut self.paired_viewers, viewers);
      self.update_viewer_boxes(viewers, &layout);
      unpaired
    };

    let streaming = store.is_streaming_enabled();
    if streaming {
      let _span = tracing::info_span!("data_blocks_sliding_box").entered();
      data_window::process_data_blocks_sliding_box(
        &mut self.paired_viewers,
        &mut self.lods,
        &layout,
        store,
        can_load,
        &mut output,
      );
    } else if !store.is_full_load_completed() {
      // Nothing was applied, diff against the same boxes once loading is done
      for paired_viewer in &mut self.paired_viewers {
        paired_viewer.state = paired_viewer.prev_state;
      }
      remove_unpaired_viewers(&mut self.paired_viewers, &unpaired);
      return Ok(self.finish(output, start));
    }

    {
      let _span = tracing::info_span!("mesh_blocks_sliding_box").entered();
      mesh_window::process_mesh_blocks_sliding_box(
        &mut self.paired_viewers,
        &mut self.lods,
        &layout,
        &*store,
        streaming,
        can_load,
        &mut output,
      );
    }

    remove_unpaired_viewers(&mut self.paired_viewers, &unpaired);

    let data_completions = self.mailbox.drain_data_blocks();
    output.stats.data_completions = data_completions.len();
    if streaming {
      let _span = tracing::info_span!("process_loaded_data_blocks").entered();
      loaded::process_loaded_data_blocks(&data_completions, &mut self.lods, &layout, store);
    } else if !data_completions.is_empty() {
      tracing::debug!(count = data_completions.len(), "Ignoring data completions, volume is fully loaded");
    }

    let mesh_completions = self.mailbox.drain_mesh_blocks();
    output.stats.mesh_completions = mesh_completions.len();
    {
      let _span = tracing::info_span!("process_loaded_mesh_blocks").entered();
      loaded::process_loaded_mesh_blocks(
        &mesh_completions,
        &self.lods,
        self.settings.enable_transition_updates,
        &mut output,
      );
    }

    if can_mesh {
      self.send_mesh_updates(&mut output);
    }

    Ok(self.finish(output, start))
  }

  /// Check the data store against the settings and size the LOD states.
  fn prepare_lods(&mut self, store: &impl VoxelDataStore) -> Result<BoxLayout, StreamingError> {
    let lod_count = store.lod_count();
    if lod_count == 0 || lod_count > MAX_LOD_COUNT {
      return Err(StreamingError::InvalidLodCount(lod_count));
    }

    let data_block_size_po2 = store.block_size_po2();
    if self.settings.mesh_block_size_po2 < data_block_size_po2 {
      return Err(StreamingError::MeshBlockSmallerThanData {
        mesh_po2: self.settings.mesh_block_size_po2,
        data_po2: data_block_size_po2,
      });
    }

    if self.lods.is_empty() {
      self.lods = (0..lod_count).map(|_| LodState::default()).collect();
    } else if self.lods.len() != lod_count {
      return Err(StreamingError::LodCountChanged {
        previous: self.lods.len(),
        current: lod_count,
      });
    }

    Ok(BoxLayout {
      lod_count,
      mesh_block_size_po2: self.settings.mesh_block_size_po2,
      data_block_size_po2,
      bounds_in_voxels: store.bounds_in_voxels(),
      lod_distance_in_mesh_chunks: self.settings.lod_distance_in_chunks(),
    })
  }

  fn update_viewer_boxes(&mut self, viewers: &[Viewer], layout: &BoxLayout) {
    let index_by_id: HashMap<ViewerId, usize> = self
      .paired_viewers
      .iter()
      .enumerate()
      .map(|(index, pv)| (pv.id, index))
      .collect();

    for viewer in viewers {
      let Some(&index) = index_by_id.get(&viewer.id) else {
        continue;
      };
      let state = &mut self.paired_viewers[index].state;
      state.update_from(viewer, &self.volume, self.settings.view_distance_voxels);
      compute_viewer_boxes(layout, state);
    }
  }

  /// Move queued updates that are still wanted to the output.
  fn send_mesh_updates(&mut self, output: &mut TickOutput) {
    for (lod, lod_state) in self.lods.iter_mut().enumerate() {
      if lod_state.mesh_blocks_pending_update.is_empty() {
        continue;
      }
      let mut map = lod_state.mesh_map.write();
      for position in lod_state.mesh_blocks_pending_update.drain(..) {
        let Some(block) = map.get_mut(&position) else {
          continue;
        };
        if block.state != MeshState::UpdateNotSent {
          continue;
        }
        block.state = MeshState::UpdateSent;
        output.mesh_blocks_to_update.push(ChunkLocation::new(position, lod as u8));
      }
    }
  }

  fn finish(&mut self, mut output: TickOutput, start: Instant) -> TickOutput {
    output.stats.paired_viewers = self.paired_viewers.len();
    output.stats.data_blocks_requested = output.data_blocks_to_load.len();
    output.stats.data_blocks_unloaded = output.data_blocks_unloaded.len();
    output.stats.data_loads_cancelled = output.data_loads_cancelled.len();
    output.stats.mesh_blocks_removed = output.mesh_blocks_to_unload.len();
    output.stats.mesh_updates_sent = output.mesh_blocks_to_update.len();
    output.stats.visibility_changes = output.visibility_changes.len();
    output.stats.elapsed_us = start.elapsed().as_micros() as u64;

    if !output.is_idle() {
      let stats = &output.stats;
      tracing::trace!(
        load = stats.data_blocks_requested,
        unload = stats.data_blocks_unloaded,
        mesh = stats.mesh_updates_sent,
        visibility = stats.visibility_changes,
        "Streaming tick"
      );
    }
    self.metrics.record_tick(&output.stats);
    output
  }

  // ---------------------------------------------------------------------------
  // Accessors
  // ---------------------------------------------------------------------------

  pub fn settings(&self) -> &StreamingSettings {
    &self.settings
  }

  pub fn volume(&self) -> &StreamedVolume {
    &self.volume
  }

  pub fn paired_viewers(&self) -> &[PairedViewer] {
    &self.paired_viewers
  }

  /// Handle for workers to post completions.
  pub fn completion_sender(&self) -> CompletionSender {
    self.mailbox.sender()
  }

  /// LOD count seen on the first tick, 0 before it.
  pub fn lod_count(&self) -> usize {
    self.lods.len()
  }

  /// Shared mesh map of `lod`.
  pub fn mesh_map(&self, lod: u8) -> Option<Arc<RwLock<MeshMap>>> {
    self.lods.get(lod as usize).map(|l| Arc::clone(&l.mesh_map))
  }

  /// Snapshot of one mesh record.
  pub fn mesh_block(&self, location: ChunkLocation) -> Option<MeshBlockState> {
    let lod_state = self.lods.get(location.lod as usize)?;
    let map = lod_state.mesh_map.read();
    map.get(&location.position).copied()
  }

  /// Requested data chunks still in flight at `lod`.
  pub fn loading_block_count(&self, lod: u8) -> usize {
    self.lods.get(lod as usize).map_or(0, |l| l.loading_blocks.len())
  }

  /// Viewer count of a data chunk still in flight.
  pub fn loading_viewers(&self, location: ChunkLocation) -> Option<u32> {
    self
      .lods
      .get(location.lod as usize)?
      .loading_blocks
      .get(&location.position)
      .map(|block| block.viewers.get())
  }

  /// Mesh updates queued but not handed out yet at `lod`.
  pub fn pending_update_count(&self, lod: u8) -> usize {
    self.lods.get(lod as usize).map_or(0, |l| l.mesh_blocks_pending_update.len())
  }

  pub fn metrics(&self) -> &StreamingMetrics {
    &self.metrics
  }
}
