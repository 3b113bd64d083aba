use std::collections::HashSet;

use glam::IVec3;

use super::*;

fn b(min: [i32; 3], max: [i32; 3]) -> Box3i {
  Box3i::from_min_max(IVec3::from_array(min), IVec3::from_array(max))
}

fn cell_set(boxes: &[Box3i]) -> HashSet<IVec3> {
  boxes.iter().flat_map(|b| b.cells()).collect()
}

// =============================================================================
// Basics
// =============================================================================

#[test]
fn test_empty_box_semantics() {
  let empty = Box3i::EMPTY;
  let unit = b([0, 0, 0], [1, 1, 1]);
  let flat = b([0, 0, 0], [4, 0, 4]);

  assert!(empty.is_empty());
  assert!(flat.is_empty());
  assert!(!unit.is_empty());

  assert!(!empty.intersects(&unit));
  assert!(!unit.intersects(&flat));
  assert!(unit.contains(&empty), "empty box is contained in everything");
  assert!(!empty.contains(&unit));
  assert_eq!(flat.volume(), 0);
  assert_eq!(flat.cells().count(), 0);
}

#[test]
fn test_from_min_max_collapses_inverted_axes() {
  let inverted = b([5, 0, 0], [2, 3, 3]);
  assert_eq!(inverted.size, IVec3::new(0, 3, 3));
  assert!(inverted.is_empty());
}

#[test]
fn test_intersects_is_half_open() {
  let a = b([0, 0, 0], [4, 4, 4]);
  let touching = b([4, 0, 0], [8, 4, 4]);
  let overlapping = b([3, 3, 3], [8, 8, 8]);

  assert!(!a.intersects(&touching));
  assert!(a.intersects(&overlapping));
  assert!(a.contains_point(IVec3::new(3, 3, 3)));
  assert!(!a.contains_point(IVec3::new(4, 0, 0)));
}

#[test]
fn test_clip() {
  let bounds = b([0, 0, 0], [10, 10, 10]);
  let mut a = b([-5, 2, 8], [3, 4, 20]);
  a.clip(&bounds);
  assert_eq!(a, b([0, 2, 8], [3, 4, 10]));

  let outside = b([20, 20, 20], [30, 30, 30]).clipped(&bounds);
  assert!(outside.is_empty());
}

#[test]
fn test_padded_grows_and_shrinks() {
  let a = b([0, 0, 0], [4, 4, 4]);
  assert_eq!(a.padded(1), b([-1, -1, -1], [5, 5, 5]));
  assert_eq!(a.padded(-1), b([1, 1, 1], [3, 3, 3]));

  let shrunk_away = a.padded(-3);
  assert!(shrunk_away.is_empty());
  assert!(shrunk_away.size.cmpge(IVec3::ZERO).all());
}

#[test]
fn test_scaled() {
  let a = b([-1, 0, 2], [1, 1, 3]);
  assert_eq!(a.scaled(4), b([-4, 0, 8], [4, 4, 12]));
}

#[test]
fn test_downscaled_rounds_outward() {
  let a = b([-1, 0, 3], [1, 4, 5]);
  assert_eq!(a.downscaled(2), b([-1, 0, 1], [1, 2, 3]));
}

#[test]
fn test_downscaled_inner_only_keeps_fully_covered_cells() {
  let a = b([-1, 0, 3], [5, 4, 5]);
  // z: [3,5) does not fully cover any coarse cell
  assert_eq!(a.downscaled_inner(2), b([0, 0, 2], [2, 2, 2]));
  assert!(a.downscaled_inner(2).is_empty());

  let aligned = b([-4, 0, 2], [4, 4, 6]);
  assert_eq!(aligned.downscaled_inner(2), b([-2, 0, 1], [2, 2, 3]));
}

#[test]
fn test_halved() {
  let a = b([-4, 2, 0], [4, 6, 8]);
  assert_eq!(a.halved(), b([-2, 1, 0], [2, 3, 4]));
}

#[test]
fn test_merge_with_ignores_empty() {
  let a = b([0, 0, 0], [2, 2, 2]);
  let far = b([5, -3, 1], [6, 1, 2]);

  let mut merged = a;
  merged.merge_with(&Box3i::EMPTY);
  assert_eq!(merged, a);

  let mut from_empty = Box3i::new(IVec3::splat(100), IVec3::ZERO);
  from_empty.merge_with(&a);
  assert_eq!(from_empty, a, "merging into an empty box adopts the other box");

  merged.merge_with(&far);
  assert_eq!(merged, b([0, -3, 0], [6, 2, 2]));
}

#[test]
fn test_cells_order_is_x_innermost() {
  let a = b([0, 0, 0], [2, 2, 1]);
  let visited: Vec<_> = a.cells().collect();

  assert_eq!(
    visited,
    vec![
      IVec3::new(0, 0, 0),
      IVec3::new(1, 0, 0),
      IVec3::new(0, 1, 0),
      IVec3::new(1, 1, 0),
    ]
  );
  assert_eq!(visited.len() as i64, a.volume());
}

#[test]
fn test_floor_and_ceil_div_negative() {
  assert_eq!(floor_div(IVec3::new(-1, -16, 15), 16), IVec3::new(-1, -1, 0));
  assert_eq!(ceil_div(IVec3::new(-1, -16, 17), 16), IVec3::new(0, -1, 2));
}

// =============================================================================
// Difference
// =============================================================================

#[test]
fn test_difference_with_self_is_empty() {
  let a = b([-2, 0, 1], [3, 4, 5]);
  assert!(a.difference_boxes(&a).is_empty());
}

#[test]
fn test_difference_with_empty_is_self() {
  let a = b([-2, 0, 1], [3, 4, 5]);
  let boxes = a.difference_boxes(&Box3i::EMPTY);
  assert_eq!(boxes.as_slice(), &[a]);
}

#[test]
fn test_difference_when_contained_is_empty() {
  let inner = b([1, 1, 1], [2, 2, 2]);
  let outer = b([0, 0, 0], [4, 4, 4]);
  assert!(inner.difference_boxes(&outer).is_empty());
}

#[test]
fn test_difference_hole_yields_six_boxes() {
  let outer = b([0, 0, 0], [4, 4, 4]);
  let hole = b([1, 1, 1], [3, 3, 3]);
  let boxes = outer.difference_boxes(&hole);
  assert_eq!(boxes.len(), 6);
  assert_eq!(boxes.iter().map(|b| b.volume()).sum::<i64>(), 64 - 8);
}

#[test]
fn test_difference_one_chunk_shift() {
  let prev = b([-3, -3, -3], [4, 4, 4]);
  let next = b([-2, -3, -3], [5, 4, 4]);

  let entering = next.difference_boxes(&prev);
  let leaving = prev.difference_boxes(&next);

  assert_eq!(entering.as_slice(), &[b([4, -3, -3], [5, 4, 4])]);
  assert_eq!(leaving.as_slice(), &[b([-3, -3, -3], [-2, 4, 4])]);
}

/// Tile check over a grid of box pairs: emitted boxes are pairwise disjoint,
/// non-empty, and their union is exactly `A \ B`.
#[test]
fn test_difference_tiles_exactly() {
  let intervals: [(i32, i32); 6] = [(0, 0), (0, 2), (1, 3), (-1, 1), (2, 4), (-2, 5)];

  let mut others = Vec::new();
  for &(x0, x1) in &intervals {
    for &(y0, y1) in &intervals {
      for &(z0, z1) in &intervals {
        others.push(b([x0, y0, z0], [x1, y1, z1]));
      }
    }
  }

  let sources = [
    b([0, 0, 0], [3, 3, 3]),
    b([-1, 0, 1], [2, 4, 3]),
    b([-2, -2, -2], [5, 5, 5]),
    b([1, 1, 1], [2, 2, 2]),
    b([0, -1, 0], [4, 1, 2]),
    b([2, 2, 2], [4, 4, 4]),
    b([0, 0, 0], [1, 5, 1]),
    Box3i::EMPTY,
  ];

  for a in &sources {
    for other in &others {
      let boxes = a.difference_boxes(other);
      assert!(boxes.len() <= 6, "{a:?} \\ {other:?} emitted {}", boxes.len());

      let mut seen = HashSet::new();
      for piece in &boxes {
        assert!(!piece.is_empty(), "{a:?} \\ {other:?} emitted an empty box");
        for cell in piece.cells() {
          assert!(seen.insert(cell), "{a:?} \\ {other:?}: cell {cell} covered twice");
        }
      }

      let expected: HashSet<IVec3> = a.cells().filter(|c| !other.contains_point(*c)).collect();
      assert_eq!(seen, expected, "{a:?} \\ {other:?} tiling mismatch");
      assert_eq!(cell_set(&boxes), expected);
    }
  }
}
