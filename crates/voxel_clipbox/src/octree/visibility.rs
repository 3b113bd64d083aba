//! LOD visibility state machine.
//!
//! Runs octree subdivision logic from a single chunk and its descendants when
//! a mesh completes. An active parent is replaced by its 8 children only when
//! all of them are loaded, so exactly one chunk along any LOD chain of a
//! loaded region is active.

use crate::octree::ChunkLocation;
use crate::types::MeshMap;

/// Activation event, in the order it happened.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum VisibilityChange {
  Activate(ChunkLocation),
  Deactivate(ChunkLocation),
}

impl VisibilityChange {
  pub fn location(&self) -> ChunkLocation {
    match *self {
      VisibilityChange::Activate(location) | VisibilityChange::Deactivate(location) => location,
    }
  }
}

/// Update activation after `location` got a mesh.
///
/// `maps[lod]` is the mesh map of each LOD, `maps.len()` the LOD count.
///
/// # Panics
///
/// When a loaded chunk below the root has no parent record; boxes of coarser
/// LODs always contain finer ones, so this is a bookkeeping bug.
pub fn update_mesh_block_load(
  maps: &mut [&mut MeshMap],
  location: ChunkLocation,
  changes: &mut Vec<VisibilityChange>,
) {
  let lod_count = maps.len();
  let lod = location.lod as usize;

  match maps[lod].get(&location.position) {
    Some(block) if block.loaded => {}
    _ => return,
  }

  let Some(parent) = location.get_parent(lod_count) else {
    // Root: no siblings to wait for
    if let Some(block) = maps[lod].get_mut(&location.position) {
      if !block.active {
        block.active = true;
        changes.push(VisibilityChange::Activate(location));
      }
    }
    if let Some(children) = location.children() {
      for child in children {
        update_mesh_block_load(maps, child, changes);
      }
    }
    return;
  };

  let parent_active = match maps[parent.lod as usize].get(&parent.position) {
    Some(parent_block) => parent_block.active,
    None => panic!("Mesh block {location:?} has no parent {parent:?}, subdivision rule broken"),
  };
  if !parent_active {
    return;
  }

  // All or nothing: the parent only splits when every sibling has a mesh
  let siblings = location.siblings();
  for sibling in &siblings {
    match maps[lod].get(&sibling.position) {
      Some(block) if block.loaded => {}
      Some(_) => return,
      None => {
        tracing::error!(?sibling, ?parent, "Missing sibling of a loaded mesh block");
        return;
      }
    }
  }

  if let Some(parent_block) = maps[parent.lod as usize].get_mut(&parent.position) {
    parent_block.active = false;
    changes.push(VisibilityChange::Deactivate(parent));
  }

  for sibling in &siblings {
    if let Some(block) = maps[lod].get_mut(&sibling.position) {
      if !block.active {
        block.active = true;
        changes.push(VisibilityChange::Activate(*sibling));
      }
    }
  }

  for sibling in &siblings {
    if let Some(children) = sibling.children() {
      for child in children {
        update_mesh_block_load(maps, child, changes);
      }
    }
  }
}

#[cfg(test)]
#[path = "visibility_test.rs"]
mod visibility_test;
