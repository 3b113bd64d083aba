//! Transition masks - faces where an active chunk borders coarser chunks.
//!
//! Renderers use the mask to stitch seams between LODs. Bit order:
//! -X, +X, -Y, +Y, -Z, +Z.

use glam::IVec3;
use rayon::prelude::*;

use crate::constants::FACE_OFFSETS;
use crate::octree::ChunkLocation;
use crate::types::MeshMap;

/// New transition mask of an active chunk.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TransitionMaskUpdate {
  pub location: ChunkLocation,
  pub mask: u8,
}

/// Compute the mask of the chunk at `position` in `map`.
///
/// A face bit is set when the same-LOD neighbor is not active and the
/// parent-LOD chunk containing that neighbor is. The root has no parent map
/// and always gets 0.
pub fn compute_transition_mask(map: &MeshMap, parent_map: Option<&MeshMap>, position: IVec3) -> u8 {
  let Some(parent_map) = parent_map else {
    return 0;
  };

  let mut mask = 0u8;
  for (bit, offset) in FACE_OFFSETS.iter().enumerate() {
    let neighbor = position + *offset;
    if map.get(&neighbor).is_some_and(|block| block.active) {
      continue;
    }
    if parent_map.get(&(neighbor >> 1)).is_some_and(|block| block.active) {
      mask |= 1 << bit;
    }
  }
  mask
}

/// Recompute masks of active chunks in every LOD selected by `lods_mask`.
///
/// Masks are computed in parallel, then written back. One update is pushed
/// per chunk whose mask changed, ordered by LOD then position.
#[cfg_attr(feature = "instrument", tracing::instrument(skip_all, name = "octree::update_transition_masks"))]
pub fn update_transition_masks(
  maps: &mut [&mut MeshMap],
  lods_mask: u32,
  updates: &mut Vec<TransitionMaskUpdate>,
) {
  let lod_count = maps.len();
  let mut changed: Vec<(usize, Vec<(IVec3, u8)>)> = Vec::new();

  {
    let shared: Vec<&MeshMap> = maps.iter().map(|map| &**map).collect();
    for lod in 0..lod_count {
      if lods_mask & (1 << lod) == 0 {
        continue;
      }
      let map = shared[lod];
      let parent_map = shared.get(lod + 1).copied();

      let mut lod_changes: Vec<(IVec3, u8)> = map
        .par_iter()
        .filter(|(_, block)| block.active)
        .filter_map(|(position, block)| {
          let mask = compute_transition_mask(map, parent_map, *position);
          (mask != block.transition_mask).then_some((*position, mask))
        })
        .collect();

      if !lod_changes.is_empty() {
        lod_changes.sort_unstable_by_key(|(p, _)| (p.z, p.y, p.x));
        changed.push((lod, lod_changes));
      }
    }
  }

  for (lod, lod_changes) in changed {
    let map = &mut *maps[lod];
    for (position, mask) in lod_changes {
      if let Some(block) = map.get_mut(&position) {
        block.transition_mask = mask;
        updates.push(TransitionMaskUpdate {
          location: ChunkLocation::new(position, lod as u8),
          mask,
        });
      }
    }
  }
}

#[cfg(test)]
#[path = "transition_test.rs"]
mod transition_test;
