//! World constants, coordinates, noise, biome classification, and terrain config.
#![forbid(unsafe_code)]

pub mod biome;
pub mod biome_manager;
mod chunk_coord;
pub mod config;
pub mod noise;

/// Edge length of a terrain tile in world units.
pub const CHUNK_SIZE: usize = 32;
pub const CHUNK_SIZE_F: f32 = CHUNK_SIZE as f32;

/// Edge length of one Worley cell used for biome regions.
pub const BIOME_CELL_SIZE: f32 = 512.0;

pub use biome::{BiomeDefinition, BiomeTable, BiomeType};
pub use biome_manager::{BiomeManager, BiomeSample, SpawnSettings, SpawnZone};
pub use chunk_coord::ChunkCoord;
pub use config::{ConfigError, TerrainConfig, load_config_from_path};
pub use noise::{FastNoiseLattice, FbmParams, LatticeHash, NoiseKind, NoiseSource};
