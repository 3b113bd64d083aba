//! voxel_clipbox - Framework/engine independent clipbox streaming for voxel
//! volumes
//!
//! Decides, tick by tick, which data chunks and mesh chunks of a chunked,
//! multi-LOD voxel volume must be resident for a set of moving viewers, and
//! which mesh chunk is displayed at every point of the volume.
//!
//! # Features
//!
//! - **Clipbox streaming**: per-viewer boxes per LOD, diffed between ticks
//!   into load and unload requests
//! - **Multi-viewer refcounting**: chunks shared by viewers are loaded once
//!   and released by the last one
//! - **LOD visibility**: a parent is replaced by its 8 children only when all
//!   of them have a mesh, so the volume never shows holes or overlaps
//! - **Transition masks**: faces bordering coarser chunks, for seam stitching
//!
//! The crate never touches voxel payloads or meshes. The host loads data,
//! builds meshes and reports completions through a [`CompletionSender`].
//!
//! # Example
//!
//! ```ignore
//! use voxel_clipbox::{ClipboxStreaming, MemoryDataStore, StreamingSettings, Viewer};
//!
//! let mut streaming = ClipboxStreaming::new(StreamingSettings::default())?;
//! let mut store = MemoryDataStore::new(4, 4, bounds);
//! let sender = streaming.completion_sender();
//!
//! let output = streaming.process(&[Viewer::new(1, position, 256.0)], &mut store, true, true)?;
//! for location in &output.data_blocks_to_load {
//!     // Load on a worker, then:
//!     sender.data_block_loaded(*location);
//! }
//! ```

pub mod box3i;
pub mod boxes;
pub mod config;
pub mod constants;
pub mod data_store;
pub mod error;
pub mod types;

// Completion queues between workers and the tick
pub mod mailbox;
pub use mailbox::{CompletionMailbox, CompletionSender};

// Octree relations, visibility and transition masks
pub mod octree;
pub use octree::{ChunkLocation, TransitionMaskUpdate, VisibilityChange};

// Engine bridge callbacks
pub mod presentation;
pub use presentation::{NullPresentation, PresentationLayer};

// Engine-agnostic metrics
pub mod metrics;
pub use metrics::{StreamingMetrics, TickStats};

pub mod streaming;
pub use streaming::{ClipboxStreaming, TickOutput};

pub mod viewer;
pub use viewer::{PairedViewer, Viewer, ViewerId, ViewerState};

// Volume identity and transform
pub mod world;
pub use world::{StreamedVolume, VolumeId};

// Re-export commonly used items
pub use box3i::Box3i;
pub use config::StreamingSettings;
pub use data_store::{LoadResolution, MemoryDataStore, UnviewResult, ViewResult, VoxelDataStore};
pub use error::StreamingError;
pub use types::{MeshBlockState, MeshMap, MeshState, RefCount};
