//! Per-viewer box computation.
//!
//! For every LOD a viewer gets a mesh box (mesh chunks it wants built) and a
//! data box (data chunks those meshes need). Boxes follow three rules:
//!
//! - Subdivision: below the root, mesh boxes have even position and size so a
//!   coarse chunk always maps to 8 fine chunks.
//! - Neighboring: the halved LOD `L-1` box padded by [`MIN_NEIGHBOR_PADDING`]
//!   fits inside the LOD `L` box, so LOD boundaries never touch.
//! - Bounds: every box is clipped to the volume bounds in its own grid.

use glam::IVec3;

use crate::box3i::{ceil_div, floor_div, Box3i};
use crate::constants::MIN_NEIGHBOR_PADDING;
use crate::viewer::ViewerState;

/// Grid layout shared by every viewer of a volume during one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxLayout {
  pub lod_count: usize,
  pub mesh_block_size_po2: u32,
  pub data_block_size_po2: u32,
  pub bounds_in_voxels: Box3i,
  /// Chunks kept around a viewer at every LOD, at least 1.
  pub lod_distance_in_mesh_chunks: i32,
}

impl BoxLayout {
  #[inline]
  pub fn root_lod(&self) -> usize {
    self.lod_count - 1
  }

  /// Data chunks per mesh chunk along one axis.
  #[inline]
  pub fn mesh_to_data_factor(&self) -> i32 {
    1 << (self.mesh_block_size_po2 - self.data_block_size_po2)
  }

  /// Mesh chunk position to data chunk shift.
  #[inline]
  pub fn mesh_to_data_shift(&self) -> u32 {
    self.mesh_block_size_po2 - self.data_block_size_po2
  }

  pub fn mesh_bounds(&self, lod: usize) -> Box3i {
    self
      .bounds_in_voxels
      .downscaled(1 << (self.mesh_block_size_po2 + lod as u32))
  }

  /// Exact as long as the bounds are a multiple of the root data chunk size.
  pub fn data_bounds(&self, lod: usize) -> Box3i {
    let shift = self.data_block_size_po2 + lod as u32;
    Box3i::new(self.bounds_in_voxels.position >> shift as i32, self.bounds_in_voxels.size >> shift as i32)
  }

  /// Distance in mesh chunks for the root LOD: enough to cover the view
  /// distance, and never less than the LOD distance.
  pub fn last_lod_distance_in_mesh_chunks(&self, view_distance_voxels: i32) -> i32 {
    let size = 1 << (self.mesh_block_size_po2 + self.root_lod() as u32);
    ceil_div(IVec3::splat(view_distance_voxels), size)
      .x
      .max(self.lod_distance_in_mesh_chunks)
  }

  fn last_lod_distance_in_data_chunks(&self, view_distance_voxels: i32) -> i32 {
    let size = 1 << (self.data_block_size_po2 + self.root_lod() as u32);
    ceil_div(IVec3::splat(view_distance_voxels), size)
      .x
      .max(self.lod_distance_in_mesh_chunks.saturating_mul(self.mesh_to_data_factor()))
  }

  /// Data chunks a mesh chunk reads: its own plus one layer of neighbors,
  /// clipped to the volume.
  pub fn mesh_data_area(&self, mesh_position: IVec3, lod: usize) -> Box3i {
    let shift = self.mesh_to_data_shift() as i32;
    Box3i::new((mesh_position << shift) - IVec3::ONE, IVec3::splat((1 << shift) + 2)).clipped(&self.data_bounds(lod))
  }
}

/// Box of chunks of `chunk_size` voxels covering `distance_voxels` around a
/// position. With `make_even`, min and max round outward to even values.
///
/// Distances past the `i32` range saturate; callers clip the result.
pub fn base_box_in_chunks(position_voxels: IVec3, distance_voxels: i32, chunk_size: i32, make_even: bool) -> Box3i {
  let d = IVec3::splat(distance_voxels);
  // +1: without it some positions shrink the box by one chunk when the
  // distance is a multiple of the chunk size
  let mut min = floor_div(position_voxels.saturating_sub(d), chunk_size);
  let mut max = ceil_div(position_voxels.saturating_add(d).saturating_add(IVec3::ONE), chunk_size);

  if make_even {
    min = floor_div(min, 2) * 2;
    max = ceil_div(max, 2) * 2;
  }

  Box3i::from_min_max(min, max)
}

/// Recompute `state.mesh_box_per_lod` and `state.data_box_per_lod` from the
/// state's position, view distance and requirement flags.
pub fn compute_viewer_boxes(layout: &BoxLayout, state: &mut ViewerState) {
  let lod_count = layout.lod_count;
  let root = layout.root_lod();
  let position = state.local_position_voxels;

  if !state.needs_mesh_blocks() {
    for lod in 0..lod_count {
      state.mesh_box_per_lod[lod] = Box3i::EMPTY;

      let data_block_size = 1 << (layout.data_block_size_po2 + lod as u32);
      let distance_in_chunks = if lod == root {
        layout.last_lod_distance_in_data_chunks(state.view_distance_voxels)
      } else {
        layout.lod_distance_in_mesh_chunks.saturating_mul(layout.mesh_to_data_factor())
      };
      state.data_box_per_lod[lod] = base_box_in_chunks(
        position,
        distance_in_chunks.saturating_mul(data_block_size),
        data_block_size,
        lod != root,
      )
      .clipped(&layout.data_bounds(lod));
    }
    return;
  }

  let last_lod_distance = layout.last_lod_distance_in_mesh_chunks(state.view_distance_voxels);

  for lod in 0..lod_count {
    let mesh_block_size = 1 << (layout.mesh_block_size_po2 + lod as u32);
    let distance_in_chunks = if lod == root {
      last_lod_distance
    } else {
      layout.lod_distance_in_mesh_chunks
    };

    let mut mesh_box = base_box_in_chunks(
      position,
      distance_in_chunks.saturating_mul(mesh_block_size),
      mesh_block_size,
      lod != root,
    );

    if lod > 0 {
      let child_box = state.mesh_box_per_lod[lod - 1];
      if !child_box.is_empty() {
        // Child boxes are even, so halving is exact
        let mut min_box = child_box.halved().padded(MIN_NEIGHBOR_PADDING);
        if lod != root {
          min_box = min_box.downscaled(2).scaled(2);
        }
        mesh_box.merge_with(&min_box);
      }
    }

    // Clip last
    mesh_box.clip(&layout.mesh_bounds(lod));
    state.mesh_box_per_lod[lod] = mesh_box;
  }

  // Data boxes follow mesh boxes, plus one chunk for neighbor access
  let factor = layout.mesh_to_data_factor();
  for lod in 0..lod_count {
    let mesh_box = state.mesh_box_per_lod[lod];
    state.data_box_per_lod[lod] = if mesh_box.is_empty() {
      Box3i::EMPTY
    } else {
      mesh_box.scaled(factor).padded(1).clipped(&layout.data_bounds(lod))
    };
  }
}

#[cfg(test)]
#[path = "boxes_test.rs"]
mod boxes_test;
