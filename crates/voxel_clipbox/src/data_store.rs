//! VoxelDataStore - interface to the voxel payload storage.
//!
//! The streaming engine never touches voxel content. It tells the store which
//! data chunks are viewed and asks whether areas are fully resident; the host
//! owns the payload, persistence and generation.

use std::collections::HashMap;

use glam::IVec3;

use crate::box3i::Box3i;
use crate::octree::ChunkLocation;
use crate::types::RefCount;

/// Result of viewing a data chunk.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ViewResult {
  /// The chunk is resident; its viewer count was incremented.
  Resident,
  /// The chunk is not resident and must be loaded.
  Missing,
}

/// Result of unviewing a data chunk.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnviewResult {
  /// Resident and still viewed by someone else.
  StillViewed,
  /// Resident and its last viewer left; the store dropped it.
  Unloaded {
    /// The chunk was edited since it was loaded and must be saved.
    modified: bool,
  },
  /// The chunk is not resident (possibly still loading).
  Missing,
}

/// What to do with a data chunk whose load just completed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LoadResolution {
  /// Still wanted: keep it with this many viewers.
  Keep { viewers: u32 },
  /// No viewer wants it anymore.
  Discard,
}

/// Data storage consumed by [`crate::ClipboxStreaming`].
pub trait VoxelDataStore {
  /// Add a viewer to the chunk if it is resident.
  fn view(&mut self, location: ChunkLocation) -> ViewResult;

  /// Remove a viewer from the chunk if it is resident.
  fn unview(&mut self, location: ChunkLocation) -> UnviewResult;

  /// True when every data chunk of `area` (in the grid of `lod`) is resident.
  fn has_all_blocks_in_area(&self, area: Box3i, lod: u8) -> bool;

  /// Volume bounds in LOD 0 voxels.
  fn bounds_in_voxels(&self) -> Box3i;

  /// Data chunk edge length at LOD 0, as a power of two.
  fn block_size_po2(&self) -> u32;

  fn lod_count(&self) -> usize;

  /// False when the whole volume is loaded up front.
  fn is_streaming_enabled(&self) -> bool;

  /// Only meaningful when streaming is disabled.
  fn is_full_load_completed(&self) -> bool;

  /// Settle a completed load, see [`LoadResolution`].
  fn resolve_loaded_block(&mut self, location: ChunkLocation, resolution: LoadResolution);
}

#[derive(Clone, Copy, Debug, Default)]
struct StoredBlock {
  viewers: RefCount,
  modified: bool,
}

/// In-memory [`VoxelDataStore`] tracking residency, viewers and edits.
///
/// Used for headless hosts, tests and benches. Completed loads become
/// resident through [`VoxelDataStore::resolve_loaded_block`].
#[derive(Clone, Debug)]
pub struct MemoryDataStore {
  block_size_po2: u32,
  bounds_in_voxels: Box3i,
  streaming: bool,
  full_load_completed: bool,
  lods: Vec<HashMap<IVec3, StoredBlock>>,
}

impl MemoryDataStore {
  /// Streaming store with nothing resident.
  pub fn new(block_size_po2: u32, lod_count: usize, bounds_in_voxels: Box3i) -> Self {
    Self {
      block_size_po2,
      bounds_in_voxels,
      streaming: true,
      full_load_completed: false,
      lods: vec![HashMap::new(); lod_count],
    }
  }

  /// Store that loads everything up front; meshing waits for
  /// [`MemoryDataStore::set_full_load_completed`].
  pub fn new_full_load(block_size_po2: u32, lod_count: usize, bounds_in_voxels: Box3i) -> Self {
    Self {
      streaming: false,
      ..Self::new(block_size_po2, lod_count, bounds_in_voxels)
    }
  }

  pub fn set_full_load_completed(&mut self, completed: bool) {
    self.full_load_completed = completed;
  }

  /// Make a chunk resident with no viewers. Returns false if already resident.
  pub fn insert_block(&mut self, location: ChunkLocation) -> bool {
    let Some(lod) = self.lods.get_mut(location.lod as usize) else {
      return false;
    };
    if lod.contains_key(&location.position) {
      return false;
    }
    lod.insert(location.position, StoredBlock::default());
    true
  }

  /// Flag a resident chunk as edited. Returns false if it is not resident.
  pub fn mark_modified(&mut self, location: ChunkLocation) -> bool {
    match self.block_mut(location) {
      Some(block) => {
        block.modified = true;
        true
      }
      None => false,
    }
  }

  pub fn contains(&self, location: ChunkLocation) -> bool {
    self.block(location).is_some()
  }

  /// Viewer count of a resident chunk.
  pub fn viewer_count(&self, location: ChunkLocation) -> Option<u32> {
    self.block(location).map(|block| block.viewers.get())
  }

  /// Number of resident chunks at `lod`.
  pub fn block_count(&self, lod: u8) -> usize {
    self.lods.get(lod as usize).map_or(0, HashMap::len)
  }

  /// Resident chunk positions at `lod`, unordered.
  pub fn resident_positions(&self, lod: u8) -> impl Iterator<Item = IVec3> + '_ {
    self.lods.get(lod as usize).into_iter().flat_map(|map| map.keys().copied())
  }

  fn block(&self, location: ChunkLocation) -> Option<&StoredBlock> {
    self.lods.get(location.lod as usize)?.get(&location.position)
  }

  fn block_mut(&mut self, location: ChunkLocation) -> Option<&mut StoredBlock> {
    self.lods.get_mut(location.lod as usize)?.get_mut(&location.position)
  }
}

impl VoxelDataStore for MemoryDataStore {
  fn view(&mut self, location: ChunkLocation) -> ViewResult {
    match self.block_mut(location) {
      Some(block) => {
        block.viewers.add();
        ViewResult::Resident
      }
      None => ViewResult::Missing,
    }
  }

  fn unview(&mut self, location: ChunkLocation) -> UnviewResult {
    let Some(lod) = self.lods.get_mut(location.lod as usize) else {
      return UnviewResult::Missing;
    };
    let Some(block) = lod.get_mut(&location.position) else {
      return UnviewResult::Missing;
    };
    if block.viewers.get() == 0 {
      tracing::debug!(?location, "Unview of a block nobody viewed");
      return UnviewResult::StillViewed;
    }
    if block.viewers.remove() > 0 {
      return UnviewResult::StillViewed;
    }
    let modified = block.modified;
    lod.remove(&location.position);
    UnviewResult::Unloaded { modified }
  }

  fn has_all_blocks_in_area(&self, area: Box3i, lod: u8) -> bool {
    let Some(map) = self.lods.get(lod as usize) else {
      return false;
    };
    area.cells().all(|position| map.contains_key(&position))
  }

  fn bounds_in_voxels(&self) -> Box3i {
    self.bounds_in_voxels
  }

  fn block_size_po2(&self) -> u32 {
    self.block_size_po2
  }

  fn lod_count(&self) -> usize {
    self.lods.len()
  }

  fn is_streaming_enabled(&self) -> bool {
    self.streaming
  }

  fn is_full_load_completed(&self) -> bool {
    self.full_load_completed
  }

  fn resolve_loaded_block(&mut self, location: ChunkLocation, resolution: LoadResolution) {
    let LoadResolution::Keep { viewers } = resolution else {
      return;
    };
    let Some(lod) = self.lods.get_mut(location.lod as usize) else {
      tracing::warn!(?location, "Loaded block outside of lod range");
      return;
    };
    let block = lod.entry(location.position).or_default();
    for _ in 0..viewers {
      block.viewers.add();
    }
  }
}

#[cfg(test)]
#[path = "data_store_test.rs"]
mod data_store_test;
