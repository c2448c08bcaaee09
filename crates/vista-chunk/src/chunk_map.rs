use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use vista_geom::{Aabb, Vec3};
use vista_world::{BiomeType, CHUNK_SIZE, CHUNK_SIZE_F, ChunkCoord};

use crate::LOD_LEVELS;
use crate::handle::{MeshBackend, MeshHandle};
use crate::heightfield::Heightfield;
use crate::mesh::MeshData;
use crate::state::{AtomicChunkState, ChunkState};

/// One resident terrain tile.
///
/// Everything except state, LOD and the cached camera distance is written
/// through `&mut self` before the tile is shared as `Arc<ChunkMap>`; after
/// that the heightfield and mesh are read-only.
#[derive(Debug)]
pub struct ChunkMap {
    coord: ChunkCoord,
    state: AtomicChunkState,
    mesh: Option<MeshHandle>,
    bounds: Aabb,
    lod: AtomicU8,
    biome: BiomeType,
    heights: Heightfield,
    distance_bits: AtomicU32,
}

impl ChunkMap {
    /// Empty tile in `Unloaded` with a flat heightfield of `resolution` cells per side.
    pub fn new(coord: ChunkCoord, resolution: usize) -> Self {
        let heights = Heightfield::flat(resolution, CHUNK_SIZE_F);
        let bounds = terrain_bounds(coord, &heights);
        Self {
            coord,
            state: AtomicChunkState::new(ChunkState::Unloaded),
            mesh: None,
            bounds,
            lod: AtomicU8::new(0),
            biome: BiomeType::Plains,
            heights,
            distance_bits: AtomicU32::new(f32::INFINITY.to_bits()),
        }
    }

    /// Tile at the default collision resolution (one sample per world unit).
    pub fn with_default_resolution(coord: ChunkCoord) -> Self {
        Self::new(coord, CHUNK_SIZE)
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn state(&self) -> ChunkState {
        self.state.load()
    }

    /// Moves the tile forward to `next`. Backward or repeated transitions are
    /// refused and leave the state untouched.
    pub fn set_state(&self, next: ChunkState) -> bool {
        match self.state.advance(next) {
            Ok(_) => true,
            Err(current) => {
                log::warn!(
                    target: "terrain",
                    "refused state change {:?} -> {:?} for tile ({}, {})",
                    current,
                    next,
                    self.coord.x,
                    self.coord.z
                );
                false
            }
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state() == ChunkState::Ready
    }

    /// Installs generated terrain. Bounds follow the new heights.
    pub fn set_terrain(&mut self, biome: BiomeType, heights: Heightfield) {
        self.biome = biome;
        self.heights = heights;
        self.bounds = terrain_bounds(self.coord, &self.heights);
    }

    /// Uploads `data` and takes ownership of the new buffers. A previous
    /// mesh, if any, is released when its handle drops here.
    pub fn upload_mesh(&mut self, data: &MeshData, backend: &Arc<dyn MeshBackend>) {
        let handle = MeshHandle::upload(backend, data);
        self.mesh = Some(handle);
        self.bounds = data
            .bounds()
            .unwrap_or_else(|| terrain_bounds(self.coord, &self.heights));
    }

    #[inline]
    pub fn mesh(&self) -> Option<&MeshHandle> {
        self.mesh.as_ref()
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.mesh.as_ref().map_or(0, MeshHandle::index_count)
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    #[inline]
    pub fn lod(&self) -> u8 {
        self.lod.load(Ordering::Relaxed)
    }

    /// Returns `true` when the level changed. Levels past the last band clamp.
    pub fn set_lod(&self, lod: u8) -> bool {
        let lod = lod.min(LOD_LEVELS - 1);
        self.lod.swap(lod, Ordering::Relaxed) != lod
    }

    #[inline]
    pub fn biome(&self) -> BiomeType {
        self.biome
    }

    #[inline]
    pub fn heightfield(&self) -> &Heightfield {
        &self.heights
    }

    #[inline]
    pub fn origin(&self) -> (f32, f32) {
        self.coord.origin()
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.coord.center()
    }

    /// Bilinear height at tile-local coordinates; out-of-range input clamps.
    #[inline]
    pub fn height_at(&self, local_x: f32, local_z: f32) -> f32 {
        self.heights.height_at(local_x, local_z)
    }

    #[inline]
    pub fn normal_at(&self, local_x: f32, local_z: f32) -> Vec3 {
        self.heights.normal_at(local_x, local_z)
    }

    /// Caches and returns the horizontal distance from the tile centre to `camera`.
    pub fn update_distance(&self, camera: Vec3) -> f32 {
        let d = self.center().distance_xz(camera);
        self.distance_bits.store(d.to_bits(), Ordering::Relaxed);
        d
    }

    /// Last value stored by [`ChunkMap::update_distance`]; infinite before the first call.
    #[inline]
    pub fn distance(&self) -> f32 {
        f32::from_bits(self.distance_bits.load(Ordering::Relaxed))
    }
}

fn terrain_bounds(coord: ChunkCoord, heights: &Heightfield) -> Aabb {
    let (ox, oz) = coord.origin();
    let (lo, hi) = heights.min_max();
    let extent = heights.extent();
    Aabb::new(
        Vec3::new(ox, lo, oz),
        Vec3::new(ox + extent, hi, oz + extent),
    )
}
