//! Clipbox streaming benchmarks.
//!
//! - **box_difference**: slab decomposition of shifted boxes
//! - **compute_viewer_boxes**: per-viewer box pyramid
//! - **moving_viewer**: full ticks with completions resolved in between

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glam::{DVec3, IVec3};
use voxel_clipbox::{
  boxes::{compute_viewer_boxes, BoxLayout},
  Box3i, ClipboxStreaming, MemoryDataStore, StreamingSettings, Viewer, ViewerState,
};

const LOD_COUNT: usize = 5;
const HALF_EXTENT: i32 = 1 << 14;

fn bounds() -> Box3i {
  Box3i::from_min_max(IVec3::splat(-HALF_EXTENT), IVec3::splat(HALF_EXTENT))
}

// =============================================================================
// Boxes
// =============================================================================

fn bench_box_difference(c: &mut Criterion) {
  let mut group = c.benchmark_group("box_difference");

  for shift in [1, 4, 16] {
    let a = Box3i::new(IVec3::splat(-16), IVec3::splat(32));
    let b = Box3i::new(IVec3::new(-16 + shift, -16 + shift / 2, -16), IVec3::splat(32));

    group.bench_with_input(BenchmarkId::from_parameter(shift), &shift, |bench, _| {
      bench.iter(|| {
        let mut cells = 0i64;
        black_box(&a).difference(black_box(&b), |piece| cells += piece.volume());
        cells
      });
    });
  }

  group.finish();
}

fn bench_viewer_boxes(c: &mut Criterion) {
  let layout = BoxLayout {
    lod_count: LOD_COUNT,
    mesh_block_size_po2: 4,
    data_block_size_po2: 4,
    bounds_in_voxels: bounds(),
    lod_distance_in_mesh_chunks: 4,
  };
  let mut state = ViewerState {
    view_distance_voxels: 1024,
    requires_meshes: true,
    requires_collisions: true,
    ..ViewerState::default()
  };

  c.bench_function("compute_viewer_boxes", |b| {
    let mut x = 0;
    b.iter(|| {
      x = (x + 7) % 4096;
      state.local_position_voxels = IVec3::new(x, 0, 0);
      compute_viewer_boxes(black_box(&layout), &mut state);
      state.mesh_box_per_lod[0]
    });
  });
}

// =============================================================================
// Ticks
// =============================================================================

fn bench_moving_viewer(c: &mut Criterion) {
  let mut group = c.benchmark_group("moving_viewer");
  group.sample_size(20);

  for speed in [4.0, 16.0, 64.0] {
    group.throughput(Throughput::Elements(1));
    group.bench_with_input(BenchmarkId::from_parameter(speed), &speed, |b, &speed| {
      let settings = StreamingSettings {
        lod_distance: 64.0,
        view_distance_voxels: 2048,
        ..StreamingSettings::default()
      };
      let mut streaming = ClipboxStreaming::new(settings).expect("valid settings");
      let mut store = MemoryDataStore::new(4, LOD_COUNT, bounds());
      let sender = streaming.completion_sender();
      let mut x = 0.0;

      b.iter(|| {
        x += speed;
        if x > f64::from(HALF_EXTENT / 2) {
          x = 0.0;
        }
        let viewer = Viewer::new(1, DVec3::new(x, 0.0, 0.0), 512.0);
        let output = streaming
          .process(&[viewer], &mut store, true, true)
          .expect("tick succeeds");
        for location in &output.data_blocks_to_load {
          sender.data_block_loaded(*location);
        }
        for location in &output.mesh_blocks_to_update {
          sender.mesh_block_loaded(*location);
        }
        black_box(output.stats)
      });
    });
  }

  group.finish();
}

criterion_group!(benches, bench_box_difference, bench_viewer_boxes, bench_moving_viewer);
criterion_main!(benches);
