//! Biome classification: a radial spawn zone over a jittered-grid Worley field.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use crate::BIOME_CELL_SIZE;
use crate::biome::{BiomeDefinition, BiomeTable, BiomeType};
use crate::noise::{NoiseSource, unit_interval};

const JITTER_Z_SALT: i32 = 0x5BD1_E995;
const FEATURE_SALT: i32 = 0x2C1B_3C6D;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnSettings {
    pub center_x: f32,
    pub center_z: f32,
    pub safe_radius: f32,
    pub crater_radius: f32,
    pub crater_depth: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_z: 0.0,
            safe_radius: 96.0,
            crater_radius: 24.0,
            crater_depth: 6.0,
        }
    }
}

/// Where a point sits relative to the spawn area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnZone {
    /// Inside the crater; `offset` is a non-positive depth added to the spawn base height.
    Crater { offset: f32 },
    /// Between crater rim and safe radius; `factor` eases from 0 at the rim to 1 at the edge.
    Blend { factor: f32 },
    Open,
}

impl SpawnZone {
    /// Flattened scalar form: crater offset, blend factor, or 1.0 outside.
    #[inline]
    pub fn modifier(self) -> f32 {
        match self {
            SpawnZone::Crater { offset } => offset,
            SpawnZone::Blend { factor } => factor,
            SpawnZone::Open => 1.0,
        }
    }
}

/// Natural classification of a point, ignoring the spawn zone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomeSample {
    pub primary: BiomeType,
    pub secondary: BiomeType,
    /// Weight of `secondary` in `[0, 0.5]`; exactly 0.5 on the border between the two.
    pub secondary_weight: f32,
}

#[derive(Clone, Copy, Debug)]
struct Site {
    x: f32,
    z: f32,
    dist_sq: f32,
    biome: BiomeType,
}

pub struct BiomeManager {
    table: Arc<BiomeTable>,
    noise: Arc<dyn NoiseSource>,
    spawn: SpawnSettings,
    cell_size: f32,
}

impl BiomeManager {
    pub fn new(table: Arc<BiomeTable>, noise: Arc<dyn NoiseSource>, spawn: SpawnSettings) -> Self {
        Self {
            table,
            noise,
            spawn,
            cell_size: BIOME_CELL_SIZE,
        }
    }

    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size.max(1.0);
        self
    }

    #[inline]
    pub fn table(&self) -> &BiomeTable {
        &self.table
    }

    #[inline]
    pub fn noise(&self) -> &dyn NoiseSource {
        self.noise.as_ref()
    }

    #[inline]
    pub fn spawn(&self) -> &SpawnSettings {
        &self.spawn
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn biome_at(&self, x: f32, z: f32, seed: i32) -> BiomeType {
        if self.spawn_distance(x, z) < self.spawn.safe_radius {
            return BiomeType::Spawn;
        }
        self.nearest_sites(x, z, seed)[0].biome
    }

    pub fn sample(&self, x: f32, z: f32, seed: i32) -> BiomeSample {
        let [a, b] = self.nearest_sites(x, z, seed);
        if a.biome == b.biome {
            return BiomeSample {
                primary: a.biome,
                secondary: b.biome,
                secondary_weight: 0.0,
            };
        }
        let width =
            0.5 * (self.table.get(a.biome).blend_width + self.table.get(b.biome).blend_width);
        let sep = ((a.x - b.x).powi(2) + (a.z - b.z).powi(2)).sqrt();
        let weight = if width <= 0.0 || sep <= f32::EPSILON {
            0.0
        } else {
            // distance from the point to the perpendicular bisector of the two sites
            let edge = ((b.dist_sq - a.dist_sq) / (2.0 * sep)).max(0.0);
            if edge >= width {
                0.0
            } else {
                let t = edge / width;
                0.5 * (1.0 - t * t * (3.0 - 2.0 * t))
            }
        };
        BiomeSample {
            primary: a.biome,
            secondary: b.biome,
            secondary_weight: weight,
        }
    }

    pub fn spawn_zone(&self, x: f32, z: f32) -> SpawnZone {
        let d = self.spawn_distance(x, z);
        let crater = self.spawn.crater_radius;
        let safe = self.spawn.safe_radius;
        if crater > 0.0 && d < crater {
            let t = d / crater;
            let ease = 1.0 - (t * FRAC_PI_2).cos();
            SpawnZone::Crater {
                offset: -self.spawn.crater_depth * (1.0 - ease),
            }
        } else if d < safe {
            let span = (safe - crater).max(f32::EPSILON);
            let s = ((d - crater) / span).clamp(0.0, 1.0);
            SpawnZone::Blend { factor: s * s }
        } else {
            SpawnZone::Open
        }
    }

    #[inline]
    pub fn spawn_modifier(&self, x: f32, z: f32) -> f32 {
        self.spawn_zone(x, z).modifier()
    }

    #[inline]
    pub fn definition(&self, biome: BiomeType) -> &BiomeDefinition {
        self.table.get(biome)
    }

    #[inline]
    pub fn definition_by_id(&self, id: u8) -> &BiomeDefinition {
        self.table.get_by_id(id)
    }

    #[inline]
    fn spawn_distance(&self, x: f32, z: f32) -> f32 {
        let dx = x - self.spawn.center_x;
        let dz = z - self.spawn.center_z;
        (dx * dx + dz * dz).sqrt()
    }

    fn site(&self, seed: i32, cx: i32, cz: i32, x: f32, z: f32) -> Site {
        let jx = unit_interval(self.noise.hash(seed, cx, cz));
        let jz = unit_interval(self.noise.hash(seed ^ JITTER_Z_SALT, cx, cz));
        let feature = unit_interval(self.noise.hash(seed.wrapping_add(FEATURE_SALT), cx, cz));
        let sx = (cx as f32 + jx) * self.cell_size;
        let sz = (cz as f32 + jz) * self.cell_size;
        Site {
            x: sx,
            z: sz,
            dist_sq: (sx - x).powi(2) + (sz - z).powi(2),
            biome: BiomeType::from_feature(feature),
        }
    }

    /// Nearest and second-nearest sites over the 3x3 cell neighbourhood.
    fn nearest_sites(&self, x: f32, z: f32, seed: i32) -> [Site; 2] {
        let cell_x = (x / self.cell_size).floor() as i32;
        let cell_z = (z / self.cell_size).floor() as i32;
        let mut best = self.site(seed, cell_x, cell_z, x, z);
        let mut second: Option<Site> = None;
        for dz in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                let s = self.site(seed, cell_x + dx, cell_z + dz, x, z);
                if s.dist_sq < best.dist_sq {
                    second = Some(best);
                    best = s;
                } else if second.is_none_or(|cur| s.dist_sq < cur.dist_sq) {
                    second = Some(s);
                }
            }
        }
        [best, second.unwrap_or(best)]
    }
}
