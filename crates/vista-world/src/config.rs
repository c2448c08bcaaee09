use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::biome::{BiomeDefinition, BiomeTable, BiomeType};
use crate::biome_manager::SpawnSettings;
use crate::noise::NoiseKind;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read terrain config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse terrain config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid terrain config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct TerrainConfig {
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default)]
    pub noise: NoiseKind,
    #[serde(default)]
    pub stream: Stream,
    #[serde(default)]
    pub lod: Lod,
    #[serde(default)]
    pub spawn: Spawn,
    #[serde(default)]
    pub workers: Workers,
    #[serde(default)]
    pub biomes: Vec<BiomeOverride>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            noise: NoiseKind::default(),
            stream: Stream::default(),
            lod: Lod::default(),
            spawn: Spawn::default(),
            workers: Workers::default(),
            biomes: Vec::new(),
        }
    }
}

fn default_seed() -> i32 {
    1337
}

#[derive(Clone, Debug, Deserialize)]
pub struct Stream {
    #[serde(default = "default_view_distance")]
    pub view_distance_chunks: i32,
    #[serde(default = "default_eviction_factor")]
    pub eviction_factor: f32,
}
fn default_view_distance() -> i32 {
    8
}
fn default_eviction_factor() -> f32 {
    1.5
}
impl Default for Stream {
    fn default() -> Self {
        Self {
            view_distance_chunks: default_view_distance(),
            eviction_factor: default_eviction_factor(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Lod {
    /// Upper distance bound of LOD 0..=3; anything farther is LOD 4.
    #[serde(default = "default_lod_thresholds")]
    pub thresholds: [f32; 4],
}
fn default_lod_thresholds() -> [f32; 4] {
    [64.0, 128.0, 192.0, 256.0]
}
impl Default for Lod {
    fn default() -> Self {
        Self {
            thresholds: default_lod_thresholds(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Spawn {
    #[serde(default)]
    pub center_x: f32,
    #[serde(default)]
    pub center_z: f32,
    #[serde(default = "default_safe_radius")]
    pub safe_radius: f32,
    #[serde(default = "default_crater_radius")]
    pub crater_radius: f32,
    #[serde(default = "default_crater_depth")]
    pub crater_depth: f32,
}
fn default_safe_radius() -> f32 {
    96.0
}
fn default_crater_radius() -> f32 {
    24.0
}
fn default_crater_depth() -> f32 {
    6.0
}
impl Default for Spawn {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_z: 0.0,
            safe_radius: default_safe_radius(),
            crater_radius: default_crater_radius(),
            crater_depth: default_crater_depth(),
        }
    }
}

impl From<&Spawn> for SpawnSettings {
    fn from(cfg: &Spawn) -> Self {
        SpawnSettings {
            center_x: cfg.center_x,
            center_z: cfg.center_z,
            safe_radius: cfg.safe_radius,
            crater_radius: cfg.crater_radius,
            crater_depth: cfg.crater_depth,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Workers {
    /// Explicit worker count; unset means `max(2, hardware_threads / 2)`.
    #[serde(default)]
    pub count: Option<usize>,
}

/// Partial override of a builtin biome definition.
#[derive(Clone, Debug, Deserialize)]
pub struct BiomeOverride {
    pub biome: BiomeType,
    #[serde(default)]
    pub base_height: Option<f32>,
    #[serde(default)]
    pub height_variation: Option<f32>,
    #[serde(default)]
    pub frequency: Option<f32>,
    #[serde(default)]
    pub octaves: Option<u32>,
    #[serde(default)]
    pub persistence: Option<f32>,
    #[serde(default)]
    pub lacunarity: Option<f32>,
    #[serde(default)]
    pub surface_color: Option<[f32; 3]>,
    #[serde(default)]
    pub slope_color: Option<[f32; 3]>,
    #[serde(default)]
    pub blend_width: Option<f32>,
}

impl BiomeOverride {
    fn apply(&self, base: &BiomeDefinition) -> BiomeDefinition {
        BiomeDefinition {
            base_height: self.base_height.unwrap_or(base.base_height),
            height_variation: self.height_variation.unwrap_or(base.height_variation),
            frequency: self.frequency.unwrap_or(base.frequency),
            octaves: self.octaves.unwrap_or(base.octaves),
            persistence: self.persistence.unwrap_or(base.persistence),
            lacunarity: self.lacunarity.unwrap_or(base.lacunarity),
            surface_color: self.surface_color.unwrap_or(base.surface_color),
            slope_color: self.slope_color.unwrap_or(base.slope_color),
            blend_width: self.blend_width.unwrap_or(base.blend_width),
        }
    }
}

impl TerrainConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: TerrainConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream.view_distance_chunks < 1 {
            return Err(ConfigError::Invalid(format!(
                "stream.view_distance_chunks must be >= 1, got {}",
                self.stream.view_distance_chunks
            )));
        }
        if self.stream.eviction_factor < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "stream.eviction_factor must be >= 1.0, got {}",
                self.stream.eviction_factor
            )));
        }
        let t = &self.lod.thresholds;
        if t.iter().any(|v| !v.is_finite() || *v < 0.0) || t.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Invalid(format!(
                "lod.thresholds must be finite, non-negative and strictly ascending, got {t:?}"
            )));
        }
        if self.spawn.crater_radius < 0.0 || self.spawn.crater_radius > self.spawn.safe_radius {
            return Err(ConfigError::Invalid(format!(
                "spawn.crater_radius ({}) must lie in [0, safe_radius ({})]",
                self.spawn.crater_radius, self.spawn.safe_radius
            )));
        }
        if self.workers.count == Some(0) {
            return Err(ConfigError::Invalid("workers.count must be >= 1".into()));
        }
        Ok(())
    }

    /// Builtin table with this config's overrides applied in order.
    pub fn biome_table(&self) -> BiomeTable {
        let mut table = BiomeTable::builtin();
        for o in &self.biomes {
            let merged = o.apply(table.get(o.biome));
            table = table.with(o.biome, merged);
        }
        table
    }

    #[inline]
    pub fn spawn_settings(&self) -> SpawnSettings {
        SpawnSettings::from(&self.spawn)
    }
}

pub fn load_config_from_path(path: &Path) -> Result<TerrainConfig, ConfigError> {
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg = TerrainConfig::from_toml_str(&s)?;
    log::info!(
        target: "terrain",
        "loaded terrain config {} (seed={} view={} chunks, {} biome override(s))",
        path.display(),
        cfg.seed,
        cfg.stream.view_distance_chunks,
        cfg.biomes.len()
    );
    Ok(cfg)
}
