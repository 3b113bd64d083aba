//! StreamedVolume - identity and placement of a streamed voxel volume.
//!
//! Each volume has its own streaming state. Multiple volumes can be streamed
//! independently (overworld, dioramas, moving platforms), each placed in
//! global space by its own transform.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::{DAffine3, DVec3};

// =============================================================================
// VolumeId - unique identifier
// =============================================================================

/// Atomic counter for generating unique VolumeIds.
static VOLUME_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque volume identifier.
///
/// Generated atomically - guaranteed unique within process lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct VolumeId(u64);

impl VolumeId {
  /// Generate a new unique VolumeId.
  pub fn new() -> Self {
    Self(VOLUME_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  /// Get the raw ID value.
  pub fn raw(&self) -> u64 {
    self.0
  }
}

impl Default for VolumeId {
  fn default() -> Self {
    Self::new()
  }
}

// =============================================================================
// StreamedVolume - placement in global space
// =============================================================================

/// Placement of one streamed volume.
///
/// # Transform
///
/// `transform` converts from volume-local voxel space to global space.
/// Viewer positions go through the inverse before any box is computed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamedVolume {
  /// Unique volume identifier.
  pub id: VolumeId,

  /// Local-to-global transform (position, rotation, uniform scale).
  pub transform: DAffine3,
}

impl StreamedVolume {
  /// Create a new volume with identity transform.
  pub fn new() -> Self {
    Self {
      id: VolumeId::new(),
      transform: DAffine3::IDENTITY,
    }
  }

  /// Create a new volume placed by `transform`.
  pub fn with_transform(transform: DAffine3) -> Self {
    Self {
      id: VolumeId::new(),
      transform,
    }
  }

  /// Set the volume transform.
  pub fn set_transform(&mut self, transform: DAffine3) {
    self.transform = transform;
  }

  /// Convert a global position to volume-local space.
  #[inline]
  pub fn viewer_to_local(&self, global_pos: DVec3) -> DVec3 {
    self.transform.inverse().transform_point3(global_pos)
  }

  /// Factor converting a global distance into local voxels.
  ///
  /// Length of the inverse transform applied to the X basis vector, so
  /// non-uniform scale is not supported.
  #[inline]
  pub fn view_distance_scale(&self) -> f64 {
    self.transform.inverse().transform_vector3(DVec3::X).length()
  }
}

impl Default for StreamedVolume {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn volume_id_is_unique() {
    let id1 = VolumeId::new();
    let id2 = VolumeId::new();
    let id3 = VolumeId::new();

    assert_ne!(id1, id2);
    assert_ne!(id2, id3);
    assert_ne!(id1, id3);
  }

  #[test]
  fn identity_volume() {
    let volume = StreamedVolume::new();
    assert_eq!(volume.transform, DAffine3::IDENTITY);
    assert!((volume.view_distance_scale() - 1.0).abs() < 1e-12);
  }

  #[test]
  fn transform_roundtrip() {
    let mut volume = StreamedVolume::new();
    volume.set_transform(DAffine3::from_translation(DVec3::new(100.0, 50.0, 200.0)));

    let global_pos = DVec3::new(150.0, 75.0, 250.0);
    let local_pos = volume.viewer_to_local(global_pos);
    assert!((local_pos - DVec3::new(50.0, 25.0, 50.0)).length() < 1e-10);
    assert!((volume.transform.transform_point3(local_pos) - global_pos).length() < 1e-10);
  }

  #[test]
  fn scaled_volume_shrinks_view_distance() {
    // Volume drawn twice as large: one local voxel spans 2 global units
    let volume = StreamedVolume::with_transform(DAffine3::from_scale(DVec3::splat(2.0)));
    assert!((volume.view_distance_scale() - 0.5).abs() < 1e-12);
    assert!((volume.viewer_to_local(DVec3::new(10.0, 0.0, 0.0)).x - 5.0).abs() < 1e-12);
  }
}
