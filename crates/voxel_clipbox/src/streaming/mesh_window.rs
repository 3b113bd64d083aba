//! Mesh block sliding window.
//!
//! Diffs each viewer's mesh boxes, refcounts mesh records and reveals parent
//! chunks when their children leave.

use std::collections::hash_map::Entry;

use parking_lot::RwLock;
use smallvec::SmallVec;

use super::{LodState, TickOutput};
use crate::box3i::Box3i;
use crate::boxes::BoxLayout;
use crate::data_store::VoxelDataStore;
use crate::octree::{ChunkLocation, VisibilityChange};
use crate::types::{MeshBlockState, MeshMap, MeshState};
use crate::viewer::PairedViewer;

pub(super) fn process_mesh_blocks_sliding_box(
  paired_viewers: &mut [PairedViewer],
  lods: &mut [LodState],
  layout: &BoxLayout,
  store: &impl VoxelDataStore,
  streaming: bool,
  can_load: bool,
  output: &mut TickOutput,
) {
  for paired_viewer in paired_viewers.iter_mut() {
    for lod in (0..layout.lod_count).rev() {
      let bounds = layout.mesh_bounds(lod);
      let new_box = paired_viewer.state.mesh_box_per_lod[lod];
      let prev_box = paired_viewer.prev_state.mesh_box_per_lod[lod];

      if !new_box.intersects(&bounds) && !prev_box.intersects(&bounds) {
        break;
      }
      if new_box == prev_box {
        continue;
      }

      let lod_index = lod as u8;
      let (lower, upper) = lods.split_at_mut(lod + 1);
      let lod_state = &mut lower[lod];
      let mut map = lod_state.mesh_map.write();

      if can_load {
        for piece in new_box.difference_boxes(&prev_box) {
          for position in piece.cells() {
            let block = match map.entry(position) {
              Entry::Occupied(entry) => entry.into_mut(),
              Entry::Vacant(entry) => {
                output.stats.mesh_blocks_added += 1;
                let block = entry.insert(MeshBlockState::default());
                // Data already resident never completes again, so queue now
                if !streaming || store.has_all_blocks_in_area(layout.mesh_data_area(position, lod), lod_index) {
                  block.state = MeshState::UpdateNotSent;
                  lod_state.mesh_blocks_pending_update.push(position);
                }
                block
              }
            };
            block.mesh_viewers.add();
            block.collision_viewers.add();
          }
        }
      } else {
        paired_viewer.state.mesh_box_per_lod[lod] = prev_box.intersection(&new_box);
      }

      for piece in prev_box.difference_boxes(&new_box) {
        for position in piece.cells() {
          let Some(block) = map.get_mut(&position) else {
            continue;
          };
          block.mesh_viewers.remove();
          block.collision_viewers.remove();
          if block.is_unreferenced() {
            map.remove(&position);
            output.mesh_blocks_to_unload.push(ChunkLocation::new(position, lod_index));
          }
        }

        if let Some((parent_state, ancestors)) = upper.split_first() {
          reveal_parents(&map, &parent_state.mesh_map, ancestors, piece.downscaled(2), lod_index + 1, output);
        }
      }
    }
  }

  retain_pending_in_mesh_boxes(paired_viewers, lods);
}

/// Activate parents whose children are gone so the area stays covered.
///
/// Skipped when the children are still held by another viewer, or when an
/// ancestor is already active and covers the area.
fn reveal_parents(
  child_map: &MeshMap,
  parent_map: &RwLock<MeshMap>,
  ancestors: &[LodState],
  parent_box: Box3i,
  parent_lod: u8,
  output: &mut TickOutput,
) {
  let mut parent_map = parent_map.write();
  for position in parent_box.cells() {
    let Some(parent) = parent_map.get_mut(&position) else {
      continue;
    };
    if parent.active || child_map.contains_key(&(position << 1)) {
      continue;
    }
    if has_active_ancestor(ancestors, ChunkLocation::new(position, parent_lod)) {
      continue;
    }
    parent.active = true;
    output
      .visibility_changes
      .push(VisibilityChange::Activate(ChunkLocation::new(position, parent_lod)));
  }
}

/// `ancestors[0]` is the LOD right above `location`.
fn has_active_ancestor(ancestors: &[LodState], location: ChunkLocation) -> bool {
  let mut position = location.position;
  for lod_state in ancestors {
    position >>= 1;
    if lod_state
      .mesh_map
      .read()
      .get(&position)
      .is_some_and(|block| block.active)
    {
      return true;
    }
  }
  false
}

/// Drop pending updates outside every viewer's mesh box.
fn retain_pending_in_mesh_boxes(paired_viewers: &[PairedViewer], lods: &mut [LodState]) {
  for (lod, lod_state) in lods.iter_mut().enumerate() {
    if lod_state.mesh_blocks_pending_update.is_empty() {
      continue;
    }
    let mesh_boxes: SmallVec<[Box3i; 4]> = paired_viewers
      .iter()
      .map(|pv| pv.state.mesh_box_per_lod[lod])
      .filter(|b| !b.is_empty())
      .collect();
    lod_state
      .mesh_blocks_pending_update
      .retain(|position| mesh_boxes.iter().any(|b| b.contains_point(*position)));
  }
}
