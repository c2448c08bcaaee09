//! Tile lifecycle around a moving viewpoint: load, LOD, evict, and ground queries.
#![forbid(unsafe_code)]

mod error;
mod lod;
pub mod raycast;
mod resident;

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::HashSet;
use vista_chunk::{ChunkMap, ChunkState, MeshBackend};
use vista_geom::{Ray, Vec3};
use vista_runtime::{GeneratorSettings, TerrainGenerationRequest, TerrainGenerator};
use vista_world::{BiomeManager, CHUNK_SIZE_F, ChunkCoord, TerrainConfig};

pub use error::StreamError;
pub use lod::LodBands;
pub use raycast::{RaycastHit, TerrainSurface};
pub use resident::ResidentChunks;

/// Seconds between periodic stream statistics at debug level.
const STATS_INTERVAL: f32 = 1.0;

#[derive(Clone, Debug)]
pub struct StreamSettings {
    /// Load radius in tiles (Chebyshev bound and circular radius).
    pub view_distance_chunks: i32,
    /// Tiles farther than `eviction_factor` view radii are evicted.
    pub eviction_factor: f32,
    pub lod_thresholds: [f32; 4],
    pub generator: GeneratorSettings,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            view_distance_chunks: 8,
            eviction_factor: 1.5,
            lod_thresholds: LodBands::default().thresholds(),
            generator: GeneratorSettings::default(),
        }
    }
}

impl StreamSettings {
    pub fn from_config(cfg: &TerrainConfig) -> Self {
        Self {
            view_distance_chunks: cfg.stream.view_distance_chunks,
            eviction_factor: cfg.stream.eviction_factor,
            lod_thresholds: cfg.lod.thresholds,
            generator: GeneratorSettings {
                seed: cfg.seed,
                workers: cfg.workers.count,
                ..GeneratorSettings::default()
            },
        }
    }

    /// View radius in world units.
    #[inline]
    pub fn view_radius(&self) -> f32 {
        self.view_distance_chunks as f32 * CHUNK_SIZE_F
    }

    #[inline]
    pub fn eviction_radius(&self) -> f32 {
        self.eviction_factor * self.view_radius()
    }
}

/// What one [`TerrainManager::update`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Finished tiles moved into the resident set.
    pub completed: usize,
    /// Finished tiles discarded because their coordinate was already resident.
    pub duplicates: usize,
    pub requested: usize,
    pub lod_changes: usize,
    pub evicted: usize,
}

pub struct TerrainManager {
    settings: StreamSettings,
    lod: LodBands,
    resident: Arc<ResidentChunks>,
    pending: HashSet<ChunkCoord>,
    done_tx: Sender<Arc<ChunkMap>>,
    done_rx: Receiver<Arc<ChunkMap>>,
    generator: TerrainGenerator,
    frame: u64,
    since_stats: f32,
}

impl TerrainManager {
    pub fn new(
        biomes: Arc<BiomeManager>,
        backend: Arc<dyn MeshBackend>,
        settings: StreamSettings,
    ) -> Result<Self, StreamError> {
        let mut settings = settings;
        settings.view_distance_chunks = settings.view_distance_chunks.max(1);
        settings.eviction_factor = settings.eviction_factor.max(1.0);
        let generator = TerrainGenerator::new(biomes, backend, settings.generator.clone())?;
        let (done_tx, done_rx) = unbounded();
        log::info!(
            target: "stream",
            "terrain stream: view={} tiles ({:.0} units) evict>{:.0} units lod={:?}",
            settings.view_distance_chunks,
            settings.view_radius(),
            settings.eviction_radius(),
            settings.lod_thresholds
        );
        Ok(Self {
            lod: LodBands::new(settings.lod_thresholds),
            settings,
            resident: Arc::new(ResidentChunks::new()),
            pending: HashSet::new(),
            done_tx,
            done_rx,
            generator,
            frame: 0,
            since_stats: 0.0,
        })
    }

    /// Builds the biome table, noise source and generator described by `cfg`.
    pub fn from_config(
        cfg: &TerrainConfig,
        backend: Arc<dyn MeshBackend>,
    ) -> Result<Self, StreamError> {
        cfg.validate()?;
        let biomes = Arc::new(BiomeManager::new(
            Arc::new(cfg.biome_table()),
            cfg.noise.build(),
            cfg.spawn_settings(),
        ));
        Self::new(biomes, backend, StreamSettings::from_config(cfg))
    }

    /// One streaming step for the camera at `camera`; `dt` is the frame time in seconds.
    pub fn update(&mut self, camera: Vec3, dt: f32) -> UpdateReport {
        let mut report = UpdateReport::default();
        self.frame += 1;

        self.drain_completed(&mut report);
        self.request_missing(camera, &mut report);

        for chunk in self.resident.snapshot() {
            let d = chunk.update_distance(camera);
            if chunk.is_ready() && chunk.set_lod(self.lod.level_for(d)) {
                report.lod_changes += 1;
            }
        }

        let limit = self.settings.eviction_radius();
        let evicted = self.resident.remove_where(|chunk| {
            if chunk.distance() > limit {
                chunk.set_state(ChunkState::Unloading);
                true
            } else {
                false
            }
        });
        report.evicted = evicted.len();
        if !evicted.is_empty() {
            log::debug!(
                target: "stream",
                "[frame {}] evicted {} tile(s) beyond {:.0} units",
                self.frame,
                evicted.len(),
                limit
            );
        }

        self.since_stats += dt.max(0.0);
        if self.since_stats >= STATS_INTERVAL {
            self.since_stats = 0.0;
            log::debug!(
                target: "stream",
                "[frame {}] resident={} pending={} queued={} generated={}",
                self.frame,
                self.resident.len(),
                self.pending.len(),
                self.generator.queued_len(),
                self.generator.generated_count()
            );
        }
        report
    }

    fn drain_completed(&mut self, report: &mut UpdateReport) {
        for chunk in self.done_rx.try_iter() {
            let coord = chunk.coord();
            self.pending.remove(&coord);
            if self.resident.insert(chunk) {
                report.completed += 1;
            } else {
                report.duplicates += 1;
                log::warn!(
                    target: "stream",
                    "dropping duplicate tile ({}, {}); already resident",
                    coord.x,
                    coord.z
                );
            }
        }
    }

    fn request_missing(&mut self, camera: Vec3, report: &mut UpdateReport) {
        let center = ChunkCoord::from_world(camera.x, camera.z);
        let v = self.settings.view_distance_chunks;
        let radius = self.settings.view_radius();
        let mut batch = Vec::new();
        for dz in -v..=v {
            for dx in -v..=v {
                let coord = center.offset(dx, dz);
                let d = coord.center().distance_xz(camera);
                if d > radius || self.pending.contains(&coord) || self.resident.contains(coord) {
                    continue;
                }
                self.pending.insert(coord);
                let tx = self.done_tx.clone();
                batch.push(TerrainGenerationRequest::new(coord, d, move |chunk| {
                    let _ = tx.send(chunk);
                }));
            }
        }
        report.requested = batch.len();
        if !batch.is_empty() {
            log::trace!(
                target: "stream",
                "[frame {}] requesting {} tile(s) around ({}, {})",
                self.frame,
                batch.len(),
                center.x,
                center.z
            );
            self.generator.request_chunks(batch);
        }
    }

    /// Ground height at world XZ; 0 where no `Ready` tile is resident.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.resident.surface_height(x, z).unwrap_or(0.0)
    }

    /// Ground normal at world XZ; straight up where no `Ready` tile is resident.
    pub fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        self.resident.surface_normal(x, z)
    }

    pub fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
        raycast::raycast(self.resident.as_ref(), ray, max_distance)
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<Arc<ChunkMap>> {
        self.resident.get(coord)
    }

    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }

    /// Coordinates requested and not yet drained into the resident set.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, coord: ChunkCoord) -> bool {
        self.pending.contains(&coord)
    }

    /// Shared handle for render or physics threads.
    pub fn resident(&self) -> Arc<ResidentChunks> {
        Arc::clone(&self.resident)
    }

    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    pub fn lod_bands(&self) -> LodBands {
        self.lod
    }
}
