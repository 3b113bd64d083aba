//! Implicit octree over per-LOD mesh maps.
//!
//! No explicit tree nodes are maintained - parent/child relationships are
//! computed on demand via coordinate math on [`ChunkLocation`], and chunk
//! state lives in one [`crate::types::MeshMap`] per LOD.
//!
//! # LOD Convention
//!
//! LOD 0 = finest detail (smallest chunks), `lod_count - 1` = root.
//!
//! ```text
//! Chunk Size = mesh_block_size * 2^LOD voxels
//! ```
//!
//! # Module Structure
//!
//! - [`node`]: `ChunkLocation` - immutable value type for chunk positions
//! - [`visibility`]: parent-vs-children activation on mesh completion
//! - [`transition`]: per-face masks where a chunk borders coarser chunks

pub mod node;
pub mod transition;
pub mod visibility;

// Re-exports
pub use node::ChunkLocation;
pub use transition::{compute_transition_mask, update_transition_masks, TransitionMaskUpdate};
pub use visibility::{update_mesh_block_load, VisibilityChange};
