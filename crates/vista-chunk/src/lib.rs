//! Terrain tile entity: heightfield, render mesh, and lifecycle state.
#![forbid(unsafe_code)]

mod chunk_map;
mod handle;
mod heightfield;
pub mod mesh;
mod state;

pub use chunk_map::ChunkMap;
pub use handle::{BufferId, HeadlessMeshBackend, MeshBackend, MeshBuffers, MeshHandle};
pub use heightfield::Heightfield;
pub use mesh::{MeshData, Vertex, build_terrain_mesh};
pub use state::ChunkState;

/// Number of distance bands; LOD levels run `0..LOD_LEVELS`.
pub const LOD_LEVELS: u8 = 5;
