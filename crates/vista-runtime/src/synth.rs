use std::sync::Arc;
use std::time::Instant;

use vista_chunk::mesh::central_difference_normals;
use vista_chunk::{ChunkMap, ChunkState, Heightfield, MeshBackend, build_terrain_mesh};
use vista_world::noise::fbm_2d;
use vista_world::{BiomeDefinition, BiomeManager, BiomeType, CHUNK_SIZE_F, ChunkCoord, SpawnZone};

/// Pure terrain height function plus the per-tile pipeline built on it.
///
/// Heights depend only on world XZ and the seed, so neighbouring tiles agree
/// on their shared edge without talking to each other.
pub struct ChunkSynth {
    biomes: Arc<BiomeManager>,
    seed: i32,
    resolution: usize,
}

impl ChunkSynth {
    pub fn new(biomes: Arc<BiomeManager>, seed: i32, resolution: usize) -> Self {
        Self {
            biomes,
            seed,
            resolution: resolution.max(1),
        }
    }

    #[inline]
    pub fn seed(&self) -> i32 {
        self.seed
    }

    #[inline]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    #[inline]
    pub fn biomes(&self) -> &BiomeManager {
        &self.biomes
    }

    /// Final elevation at a world position, spawn shaping included.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let spawn_base = self.biomes.definition(BiomeType::Spawn).base_height;
        match self.biomes.spawn_zone(x, z) {
            SpawnZone::Crater { offset } => spawn_base + offset,
            SpawnZone::Blend { factor } => {
                let natural = self.natural_height(x, z);
                spawn_base + (natural - spawn_base) * factor
            }
            SpawnZone::Open => self.natural_height(x, z),
        }
    }

    /// Biome-blended fBm elevation, ignoring the spawn area.
    pub fn natural_height(&self, x: f32, z: f32) -> f32 {
        let s = self.biomes.sample(x, z, self.seed);
        let primary = self.biome_height(self.biomes.definition(s.primary), x, z);
        if s.secondary_weight <= 0.0 {
            return primary;
        }
        let secondary = self.biome_height(self.biomes.definition(s.secondary), x, z);
        primary * (1.0 - s.secondary_weight) + secondary * s.secondary_weight
    }

    fn biome_height(&self, def: &BiomeDefinition, x: f32, z: f32) -> f32 {
        let n = fbm_2d(self.biomes.noise(), self.seed, x, z, &def.fbm());
        def.base_height + def.height_variation * n
    }

    /// Height samples for the tile plus one extra ring on every side,
    /// `(resolution + 3)²` values, row-major with z as the row.
    pub fn padded_heights(&self, coord: ChunkCoord) -> Vec<f32> {
        let (ox, oz) = coord.origin();
        let step = CHUNK_SIZE_F / self.resolution as f32;
        let pside = self.resolution + 3;
        let mut out = Vec::with_capacity(pside * pside);
        for j in 0..pside {
            let z = oz + (j as f32 - 1.0) * step;
            for k in 0..pside {
                let x = ox + (k as f32 - 1.0) * step;
                out.push(self.height_at(x, z));
            }
        }
        out
    }

    /// Runs the full pipeline for one tile and leaves it `Ready`.
    pub fn generate(&self, coord: ChunkCoord, backend: &Arc<dyn MeshBackend>) -> ChunkMap {
        let t_start = Instant::now();
        let res = self.resolution;
        let mut map = ChunkMap::new(coord, res);
        map.set_state(ChunkState::Generating);

        let padded = self.padded_heights(coord);
        let side = res + 1;
        let pside = res + 3;
        let mut samples = Vec::with_capacity(side * side);
        for j in 0..side {
            let row = (j + 1) * pside + 1;
            samples.extend_from_slice(&padded[row..row + side]);
        }
        let center = coord.center();
        let biome = self.biomes.biome_at(center.x, center.z, self.seed);
        map.set_terrain(biome, Heightfield::from_samples(res, CHUNK_SIZE_F, samples));
        let t_gen_ms = t_start.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;

        map.set_state(ChunkState::MeshBuilding);
        let t_mesh = Instant::now();
        let step = map.heightfield().step();
        let normals = central_difference_normals(&padded, res, step);
        let mesh = build_terrain_mesh(map.heightfield(), &normals, coord.origin(), map.lod());
        map.upload_mesh(&mesh, backend);
        let t_mesh_ms = t_mesh.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
        map.set_state(ChunkState::Ready);

        log::debug!(
            target: "perf",
            "tile_ms={} gen_ms={} mesh_ms={} x={} z={} biome={} indices={}",
            t_start.elapsed().as_millis().min(u128::from(u32::MAX)) as u32,
            t_gen_ms,
            t_mesh_ms,
            coord.x,
            coord.z,
            biome.name(),
            mesh.index_count()
        );
        map
    }
}
