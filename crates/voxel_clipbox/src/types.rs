//! Core record types for streamed chunks.

use std::collections::HashMap;

use glam::IVec3;

/// Explicit reference counter.
///
/// Removing from a zero count is a logic error; debug builds assert and
/// release builds saturate.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct RefCount(u32);

impl RefCount {
  pub fn new(count: u32) -> Self {
    Self(count)
  }

  #[inline]
  pub fn add(&mut self) {
    self.0 += 1;
  }

  /// Decrement and return the remaining count.
  #[inline]
  pub fn remove(&mut self) -> u32 {
    debug_assert!(self.0 > 0, "RefCount removed below zero");
    self.0 = self.0.saturating_sub(1);
    self.0
  }

  #[inline]
  pub fn get(&self) -> u32 {
    self.0
  }
}

/// Mesh generation state of a mesh chunk.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MeshState {
  /// No mesh request was ever issued.
  #[default]
  NeverUpdated,
  /// Queued in this engine but not yet handed to the mesher.
  UpdateNotSent,
  /// A queued update was cancelled and must be requested again.
  NeedUpdate,
  /// Handed to the mesher, result pending.
  UpdateSent,
  /// Mesh result received.
  UpToDate,
}

impl MeshState {
  /// True when a data arrival should queue a new mesh update.
  #[inline]
  pub fn wants_update(self) -> bool {
    matches!(self, MeshState::NeverUpdated | MeshState::NeedUpdate)
  }
}

/// Per-chunk mesh record at one LOD.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MeshBlockState {
  pub state: MeshState,
  /// Currently chosen for display.
  pub active: bool,
  /// A mesh result was received at least once.
  pub loaded: bool,
  pub mesh_viewers: RefCount,
  pub collision_viewers: RefCount,
  /// Faces bordering coarser active chunks (-X, +X, -Y, +Y, -Z, +Z).
  pub transition_mask: u8,
}

impl MeshBlockState {
  /// True when no viewer holds this record anymore.
  #[inline]
  pub fn is_unreferenced(&self) -> bool {
    self.mesh_viewers.get() == 0 && self.collision_viewers.get() == 0
  }
}

/// Mesh records of one LOD, keyed by grid position.
pub type MeshMap = HashMap<IVec3, MeshBlockState>;

/// Data chunk that was requested but has not arrived yet.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LoadingDataBlock {
  pub viewers: RefCount,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
