//! Data block sliding window.
//!
//! Diffs each viewer's data boxes against the previous tick, views and
//! unviews chunks in the data store and tracks in-flight loads.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use glam::IVec3;
use smallvec::SmallVec;

use super::{LodState, TickOutput};
use crate::box3i::Box3i;
use crate::boxes::BoxLayout;
use crate::data_store::{UnviewResult, ViewResult, VoxelDataStore};
use crate::octree::ChunkLocation;
use crate::types::{LoadingDataBlock, MeshState, RefCount};
use crate::viewer::PairedViewer;

pub(super) fn process_data_blocks_sliding_box(
  paired_viewers: &mut [PairedViewer],
  lods: &mut [LodState],
  layout: &BoxLayout,
  store: &mut impl VoxelDataStore,
  can_load: bool,
  output: &mut TickOutput,
) {
  for paired_viewer in paired_viewers.iter_mut() {
    // Coarse to fine: once a LOD misses the bounds, finer ones do too
    for lod in (0..layout.lod_count).rev() {
      let bounds = layout.data_bounds(lod);
      let new_box = paired_viewer.state.data_box_per_lod[lod];
      let prev_box = paired_viewer.prev_state.data_box_per_lod[lod];

      if !new_box.intersects(&bounds) && !prev_box.intersects(&bounds) {
        break;
      }
      if new_box == prev_box {
        continue;
      }

      let lod_state = &mut lods[lod];
      let lod_index = lod as u8;

      if can_load {
        for piece in new_box.difference_boxes(&prev_box) {
          for position in piece.cells() {
            let location = ChunkLocation::new(position, lod_index);
            if store.view(location) == ViewResult::Missing
              && add_loading_block(&mut lod_state.loading_blocks, position)
            {
              output.data_blocks_to_load.push(location);
            }
          }
        }
      } else {
        // Only the unloads below are applied
        paired_viewer.state.data_box_per_lod[lod] = prev_box.intersection(&new_box);
      }

      for piece in prev_box.difference_boxes(&new_box) {
        for position in piece.cells() {
          unview_block(store, lod_state, ChunkLocation::new(position, lod_index), output);
        }
      }
    }
  }

  cancel_pending_mesh_updates(paired_viewers, lods, layout);
}

/// Count a viewer on a loading chunk. Returns true for its first viewer.
fn add_loading_block(loading_blocks: &mut HashMap<IVec3, LoadingDataBlock>, position: IVec3) -> bool {
  match loading_blocks.entry(position) {
    Entry::Vacant(entry) => {
      entry.insert(LoadingDataBlock {
        viewers: RefCount::new(1),
      });
      true
    }
    Entry::Occupied(mut entry) => {
      entry.get_mut().viewers.add();
      false
    }
  }
}

fn unview_block(
  store: &mut impl VoxelDataStore,
  lod_state: &mut LodState,
  location: ChunkLocation,
  output: &mut TickOutput,
) {
  match store.unview(location) {
    UnviewResult::StillViewed => {}
    UnviewResult::Unloaded { modified } => {
      lod_state.loading_blocks.remove(&location.position);
      output.data_blocks_unloaded.push(location);
      if modified {
        output.data_blocks_to_save.push(location);
      }
    }
    UnviewResult::Missing => {
      let Some(loading_block) = lod_state.loading_blocks.get_mut(&location.position) else {
        tracing::debug!(?location, "Unview of a loading block that was never requested");
        return;
      };
      if loading_block.viewers.remove() > 0 {
        return;
      }

      // No data box contains it anymore
      lod_state.loading_blocks.remove(&location.position);
      match output.data_blocks_to_load.iter().position(|l| *l == location) {
        Some(index) => {
          output.data_blocks_to_load.remove(index);
        }
        None => output.data_loads_cancelled.push(location),
      }
    }
  }
}

/// Mesh chunks of `data_box` whose neighboring data chunks all lie inside it.
///
/// Sides on the volume border keep their outer layer, there is no data beyond
/// them to wait for.
pub(super) fn meshable_area(data_box: Box3i, data_bounds: &Box3i, mesh_to_data_factor: i32) -> Box3i {
  if data_box.is_empty() {
    return Box3i::EMPTY;
  }
  let min = IVec3::select(
    data_box.min().cmple(data_bounds.min()),
    data_box.min(),
    data_box.min() + IVec3::ONE,
  );
  let max = IVec3::select(
    data_box.max().cmpge(data_bounds.max()),
    data_box.max(),
    data_box.max() - IVec3::ONE,
  );
  let area = Box3i::from_min_max(min, max);
  if mesh_to_data_factor > 1 {
    area.downscaled_inner(mesh_to_data_factor)
  } else {
    area
  }
}

/// Drop pending mesh updates no viewer's data box can feed anymore and mark
/// them for a later update.
fn cancel_pending_mesh_updates(paired_viewers: &[PairedViewer], lods: &mut [LodState], layout: &BoxLayout) {
  let factor = layout.mesh_to_data_factor();

  for (lod, lod_state) in lods.iter_mut().enumerate() {
    if lod_state.mesh_blocks_pending_update.is_empty() {
      continue;
    }

    let bounds = layout.data_bounds(lod);
    let keep: SmallVec<[Box3i; 4]> = paired_viewers
      .iter()
      .map(|pv| meshable_area(pv.state.data_box_per_lod[lod], &bounds, factor))
      .filter(|area| !area.is_empty())
      .collect();

    let mut map = lod_state.mesh_map.write();
    lod_state.mesh_blocks_pending_update.retain(|position| {
      if keep.iter().any(|area| area.contains_point(*position)) {
        return true;
      }
      if let Some(block) = map.get_mut(position) {
        block.state = MeshState::NeedUpdate;
      }
      false
    });
  }
}
