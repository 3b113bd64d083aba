use glam::IVec3;

use super::*;

fn store() -> MemoryDataStore {
  MemoryDataStore::new(4, 2, Box3i::from_min_max(IVec3::splat(-256), IVec3::splat(256)))
}

fn loc(x: i32, y: i32, z: i32) -> ChunkLocation {
  ChunkLocation::new(IVec3::new(x, y, z), 0)
}

#[test]
fn test_view_missing_block() {
  let mut store = store();
  assert_eq!(store.view(loc(0, 0, 0)), ViewResult::Missing);
  assert_eq!(store.unview(loc(0, 0, 0)), UnviewResult::Missing);
  assert_eq!(store.block_count(0), 0);
}

#[test]
fn test_view_n_times_unview_n_times_unloads() {
  let mut store = store();
  let chunk = loc(1, -2, 3);
  store.resolve_loaded_block(chunk, LoadResolution::Keep { viewers: 0 });

  for _ in 0..5 {
    assert_eq!(store.view(chunk), ViewResult::Resident);
  }
  assert_eq!(store.viewer_count(chunk), Some(5));

  for _ in 0..4 {
    assert_eq!(store.unview(chunk), UnviewResult::StillViewed);
  }
  assert_eq!(store.unview(chunk), UnviewResult::Unloaded { modified: false });
  assert!(!store.contains(chunk));
}

#[test]
fn test_modified_block_reports_save() {
  let mut store = store();
  let chunk = loc(0, 0, 0);
  store.resolve_loaded_block(chunk, LoadResolution::Keep { viewers: 1 });
  assert!(store.mark_modified(chunk));
  assert!(!store.mark_modified(loc(9, 9, 9)));

  assert_eq!(store.unview(chunk), UnviewResult::Unloaded { modified: true });
}

#[test]
fn test_discard_does_not_store() {
  let mut store = store();
  store.resolve_loaded_block(loc(0, 0, 0), LoadResolution::Discard);
  assert!(!store.contains(loc(0, 0, 0)));
}

#[test]
fn test_has_all_blocks_in_area() {
  let mut store = store();
  let area = Box3i::new(IVec3::ZERO, IVec3::new(2, 1, 1));
  assert!(!store.has_all_blocks_in_area(area, 0));

  store.insert_block(loc(0, 0, 0));
  assert!(!store.has_all_blocks_in_area(area, 0));
  store.insert_block(loc(1, 0, 0));
  assert!(store.has_all_blocks_in_area(area, 0));

  // Other LODs are separate grids
  assert!(!store.has_all_blocks_in_area(area, 1));
  // Out of range LOD
  assert!(!store.has_all_blocks_in_area(area, 7));
}

#[test]
fn test_insert_block_once() {
  let mut store = store();
  assert!(store.insert_block(loc(0, 0, 0)));
  assert!(!store.insert_block(loc(0, 0, 0)));
  assert!(!store.insert_block(ChunkLocation::new(IVec3::ZERO, 5)));
  assert_eq!(store.resident_positions(0).collect::<Vec<_>>(), vec![IVec3::ZERO]);
}

#[test]
fn test_full_load_store_flags() {
  let mut store =
    MemoryDataStore::new_full_load(4, 1, Box3i::from_min_max(IVec3::ZERO, IVec3::splat(64)));
  assert!(!store.is_streaming_enabled());
  assert!(!store.is_full_load_completed());
  store.set_full_load_completed(true);
  assert!(store.is_full_load_completed());
  assert_eq!(store.lod_count(), 1);
}
