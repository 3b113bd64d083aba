//! Viewers and viewer pairing.
//!
//! A [`Viewer`] is the host's per-tick snapshot of an observer. The streaming
//! engine pairs each viewer id with a [`PairedViewer`] holding the boxes it
//! computed this tick and the previous one.

use std::collections::HashSet;

use glam::{DVec3, IVec3};

use crate::box3i::Box3i;
use crate::constants::MAX_LOD_COUNT;
use crate::world::StreamedVolume;

/// Host-assigned viewer identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ViewerId(pub u32);

/// Observer snapshot provided by the host each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewer {
  pub id: ViewerId,
  /// Position in global space.
  pub world_position: DVec3,
  /// View distance in global units.
  pub view_distance: f64,
  pub require_visuals: bool,
  pub require_collisions: bool,
}

impl Viewer {
  /// Viewer requesting visuals and collisions.
  pub fn new(id: u32, world_position: DVec3, view_distance: f64) -> Self {
    Self {
      id: ViewerId(id),
      world_position,
      view_distance,
      require_visuals: true,
      require_collisions: true,
    }
  }
}

/// What a paired viewer wants this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ViewerState {
  pub data_box_per_lod: [Box3i; MAX_LOD_COUNT],
  pub mesh_box_per_lod: [Box3i; MAX_LOD_COUNT],
  pub local_position_voxels: IVec3,
  pub view_distance_voxels: i32,
  pub requires_meshes: bool,
  pub requires_collisions: bool,
}

impl ViewerState {
  /// Refresh position, view distance and flags from a viewer snapshot.
  ///
  /// The view distance is scaled into volume-local space and capped by
  /// `max_view_distance_voxels`. Non-uniform volume scale is not supported.
  pub fn update_from(&mut self, viewer: &Viewer, volume: &StreamedVolume, max_view_distance_voxels: i32) {
    let local_position = volume.viewer_to_local(viewer.world_position);
    self.local_position_voxels = local_position.floor().as_ivec3();

    let view_distance_voxels = (viewer.view_distance * volume.view_distance_scale()) as i32;
    self.view_distance_voxels = view_distance_voxels.clamp(0, max_view_distance_voxels.max(0));

    // Independent of `can_mesh`, which only pauses update hand-out
    self.requires_meshes = viewer.require_visuals;
    self.requires_collisions = viewer.require_collisions;
  }

  /// True when this viewer needs mesh chunks at all.
  #[inline]
  pub fn needs_mesh_blocks(&self) -> bool {
    self.requires_meshes || self.requires_collisions
  }

  /// Force every box empty.
  pub fn clear_boxes(&mut self) {
    self.data_box_per_lod = [Box3i::EMPTY; MAX_LOD_COUNT];
    self.mesh_box_per_lod = [Box3i::EMPTY; MAX_LOD_COUNT];
  }
}

/// Tracked viewer with its current and previous state.
#[derive(Clone, Debug, PartialEq)]
pub struct PairedViewer {
  pub id: ViewerId,
  pub state: ViewerState,
  /// Exactly `state` as it was at the end of the previous tick.
  pub prev_state: ViewerState,
}

impl PairedViewer {
  pub fn new(id: ViewerId) -> Self {
    Self {
      id,
      state: ViewerState::default(),
      prev_state: ViewerState::default(),
    }
  }
}

/// Synchronize `paired` with the live viewer set.
///
/// Every paired viewer's `prev_state` becomes its current `state`. Viewers no
/// longer present get empty boxes and a zero view distance, so the diff passes
/// unload everything they held; their indices are returned in ascending
/// order. New viewers are appended with empty state.
pub fn pair_viewers(paired: &mut Vec<PairedViewer>, viewers: &[Viewer]) -> Vec<usize> {
  let live: HashSet<ViewerId> = viewers.iter().map(|v| v.id).collect();
  let mut unpaired = Vec::new();

  for (index, paired_viewer) in paired.iter_mut().enumerate() {
    paired_viewer.prev_state = paired_viewer.state;

    if !live.contains(&paired_viewer.id) {
      tracing::debug!(viewer = paired_viewer.id.0, "Viewer destroyed, unloading its chunks");
      paired_viewer.state.view_distance_voxels = 0;
      paired_viewer.state.clear_boxes();
      unpaired.push(index);
    }
  }

  let known: HashSet<ViewerId> = paired.iter().map(|pv| pv.id).collect();
  for viewer in viewers {
    if !known.contains(&viewer.id) {
      tracing::debug!(viewer = viewer.id.0, "Pairing viewer");
      paired.push(PairedViewer::new(viewer.id));
    }
  }

  unpaired
}

/// Remove the viewers returned by [`pair_viewers`], iterating from the back so
/// the remaining indices stay valid.
pub fn remove_unpaired_viewers(paired: &mut Vec<PairedViewer>, unpaired: &[usize]) {
  for &index in unpaired.iter().rev() {
    tracing::debug!(viewer = paired[index].id.0, "Unpairing viewer");
    paired.swap_remove(index);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn viewer(id: u32) -> Viewer {
    Viewer::new(id, DVec3::ZERO, 64.0)
  }

  #[test]
  fn test_new_viewers_are_appended() {
    let mut paired = Vec::new();
    let unpaired = pair_viewers(&mut paired, &[viewer(3), viewer(1)]);

    assert!(unpaired.is_empty());
    assert_eq!(paired.iter().map(|pv| pv.id).collect::<Vec<_>>(), vec![ViewerId(3), ViewerId(1)]);
  }

  #[test]
  fn test_vanished_viewer_is_emptied_then_removed() {
    let mut paired = Vec::new();
    pair_viewers(&mut paired, &[viewer(1), viewer(2)]);

    let held = Box3i::new(IVec3::splat(-2), IVec3::splat(4));
    paired[0].state.mesh_box_per_lod[0] = held;
    paired[0].state.data_box_per_lod[0] = held;
    paired[0].state.view_distance_voxels = 64;

    let unpaired = pair_viewers(&mut paired, &[viewer(2)]);
    assert_eq!(unpaired, vec![0]);

    let gone = &paired[0];
    assert_eq!(gone.state.view_distance_voxels, 0);
    assert!(gone.state.mesh_box_per_lod[0].is_empty());
    assert!(gone.state.data_box_per_lod[0].is_empty());
    assert_eq!(gone.prev_state.mesh_box_per_lod[0], held, "prev_state keeps the old boxes");

    remove_unpaired_viewers(&mut paired, &unpaired);
    assert_eq!(paired.len(), 1);
    assert_eq!(paired[0].id, ViewerId(2));
  }

  #[test]
  fn test_remove_several_unpaired_viewers() {
    let mut paired = Vec::new();
    pair_viewers(&mut paired, &[viewer(1), viewer(2), viewer(3), viewer(4)]);

    let unpaired = pair_viewers(&mut paired, &[viewer(2)]);
    assert_eq!(unpaired, vec![0, 2, 3]);

    remove_unpaired_viewers(&mut paired, &unpaired);
    assert_eq!(paired.iter().map(|pv| pv.id).collect::<Vec<_>>(), vec![ViewerId(2)]);
  }

  #[test]
  fn test_update_from_caps_view_distance() {
    let volume = StreamedVolume::new();
    let mut state = ViewerState::default();
    let v = Viewer::new(1, DVec3::new(8.5, -0.5, 3.0), 1000.0);

    state.update_from(&v, &volume, 256);
    assert_eq!(state.local_position_voxels, IVec3::new(8, -1, 3));
    assert_eq!(state.view_distance_voxels, 256);
    assert!(state.needs_mesh_blocks());
  }
}
