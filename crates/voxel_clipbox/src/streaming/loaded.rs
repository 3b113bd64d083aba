//! Completion handling: data arrivals trigger meshing, mesh arrivals drive
//! visibility.

use std::collections::HashSet;

use glam::IVec3;
use parking_lot::RwLockWriteGuard;

use super::{LodState, TickOutput};
use crate::box3i::Box3i;
use crate::boxes::BoxLayout;
use crate::data_store::{LoadResolution, VoxelDataStore};
use crate::octree::{update_mesh_block_load, update_transition_masks, ChunkLocation};
use crate::types::{MeshMap, MeshState};

/// Settle completed data loads, then queue mesh updates for every mesh chunk
/// whose neighborhood became resident.
#[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "streaming::process_loaded_data_blocks"))]
pub(super) fn process_loaded_data_blocks(
  loaded: &[ChunkLocation],
  lods: &mut [LodState],
  layout: &BoxLayout,
  store: &mut impl VoxelDataStore,
) {
  let mut arrived = Vec::with_capacity(loaded.len());

  for &location in loaded {
    let lod = location.lod as usize;
    let Some(lod_state) = lods.get_mut(lod) else {
      tracing::warn!(?location, "Data completion outside of lod range");
      continue;
    };
    match lod_state.loading_blocks.remove(&location.position) {
      Some(loading_block) => {
        store.resolve_loaded_block(
          location,
          LoadResolution::Keep {
            viewers: loading_block.viewers.get(),
          },
        );
        arrived.push(location);
      }
      None => {
        // Cancelled while in flight
        tracing::debug!(?location, "Discarding data block nobody waits for");
        store.resolve_loaded_block(location, LoadResolution::Discard);
      }
    }
  }

  trigger_meshing(&arrived, lods, layout, &*store);
}

fn trigger_meshing(arrived: &[ChunkLocation], lods: &mut [LodState], layout: &BoxLayout, store: &impl VoxelDataStore) {
  let shift = layout.mesh_to_data_shift();
  let mut visited: Vec<HashSet<IVec3>> = vec![HashSet::new(); lods.len()];

  for &location in arrived {
    let lod = location.lod as usize;
    let data_bounds = layout.data_bounds(lod);
    let neighborhood = Box3i::new(location.position - IVec3::ONE, IVec3::splat(3)).clipped(&data_bounds);

    let lod_state = &mut lods[lod];
    let mut map = lod_state.mesh_map.write();

    for data_position in neighborhood.cells() {
      let mesh_position = data_position >> shift as i32;
      if !visited[lod].insert(mesh_position) {
        continue;
      }
      let Some(block) = map.get_mut(&mesh_position) else {
        continue;
      };
      if !block.state.wants_update() {
        continue;
      }

      if store.has_all_blocks_in_area(layout.mesh_data_area(mesh_position, lod), location.lod) {
        block.state = MeshState::UpdateNotSent;
        lod_state.mesh_blocks_pending_update.push(mesh_position);
      }
    }
  }
}

/// Apply mesh completions: mark records loaded and update visibility.
///
/// Transition masks are then refreshed around every visibility change and
/// mesh unload of the tick, including those of the sliding window.
#[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "streaming::process_loaded_mesh_blocks"))]
pub(super) fn process_loaded_mesh_blocks(
  loaded: &[ChunkLocation],
  lods: &[LodState],
  enable_transition_updates: bool,
  output: &mut TickOutput,
) {
  if loaded.is_empty() && output.visibility_changes.is_empty() && output.mesh_blocks_to_unload.is_empty() {
    return;
  }

  // Ascending LOD order, same as the sliding window
  let mut guards: Vec<RwLockWriteGuard<'_, MeshMap>> = lods.iter().map(|l| l.mesh_map.write()).collect();
  let mut maps: Vec<&mut MeshMap> = guards.iter_mut().map(|guard| &mut **guard).collect();
  let lod_count = maps.len();

  for &location in loaded {
    let lod = location.lod as usize;
    let Some(map) = maps.get_mut(lod) else {
      tracing::warn!(?location, "Mesh completion outside of lod range");
      continue;
    };
    let Some(block) = map.get_mut(&location.position) else {
      // Unloaded while the mesher was busy
      tracing::debug!(?location, "Ignoring mesh completion of a removed block");
      continue;
    };

    if block.state == MeshState::UpdateSent {
      block.state = MeshState::UpToDate;
    }
    if block.loaded {
      // Remesh of a known block, visibility is unchanged
      continue;
    }
    block.loaded = true;
    update_mesh_block_load(&mut maps, location, &mut output.visibility_changes);
  }

  // A change at LOD L moves masks from L - 1 (parent lookups) to L + 1
  let mut lods_mask = 0u32;
  let touched = output
    .visibility_changes
    .iter()
    .map(|change| change.location())
    .chain(output.mesh_blocks_to_unload.iter().copied());
  for location in touched {
    lods_mask |= 0b111 << location.lod.saturating_sub(1);
  }
  lods_mask &= ((1u64 << lod_count) - 1) as u32;
  if enable_transition_updates && lods_mask != 0 {
    output.transition_lods_mask = lods_mask;
    update_transition_masks(&mut maps, lods_mask, &mut output.transition_mask_updates);
  }
}
