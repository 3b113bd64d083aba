use super::*;

#[test]
fn test_refcount_add_remove() {
  let mut count = RefCount::default();
  assert_eq!(count.get(), 0);

  count.add();
  count.add();
  assert_eq!(count.get(), 2);

  assert_eq!(count.remove(), 1);
  assert_eq!(count.remove(), 0);
  assert_eq!(count.get(), 0);
}

#[test]
fn test_refcount_n_adds_then_n_removes_reaches_zero() {
  let mut count = RefCount::new(0);
  for _ in 0..17 {
    count.add();
  }
  for remaining in (0..17).rev() {
    assert_eq!(count.remove(), remaining);
  }
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "below zero")]
fn test_refcount_remove_at_zero_asserts() {
  let mut count = RefCount::default();
  count.remove();
}

#[test]
fn test_mesh_state_wants_update() {
  assert!(MeshState::NeverUpdated.wants_update());
  assert!(MeshState::NeedUpdate.wants_update());
  assert!(!MeshState::UpdateNotSent.wants_update());
  assert!(!MeshState::UpdateSent.wants_update());
  assert!(!MeshState::UpToDate.wants_update());
}

#[test]
fn test_mesh_block_unreferenced() {
  let mut block = MeshBlockState::default();
  assert!(block.is_unreferenced());
  assert!(!block.active && !block.loaded);
  assert_eq!(block.state, MeshState::NeverUpdated);

  block.mesh_viewers.add();
  assert!(!block.is_unreferenced());
  block.collision_viewers.add();
  block.mesh_viewers.remove();
  assert!(!block.is_unreferenced());
  block.collision_viewers.remove();
  assert!(block.is_unreferenced());
}
