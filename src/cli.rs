use std::path::PathBuf;

use clap::Parser;
use vista_world::TerrainConfig;

use crate::flythrough::FlightPlan;

#[derive(Parser, Debug)]
#[command(
    name = "vista",
    version,
    about = "Headless fly-through over streamed terrain"
)]
pub struct Args {
    /// Terrain config (TOML); built-in defaults when omitted
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Override the world seed
    #[arg(long)]
    pub seed: Option<i32>,
    /// Override the load radius in tiles
    #[arg(long, value_name = "TILES")]
    pub view: Option<i32>,
    /// Override the terrain worker count
    #[arg(long)]
    pub workers: Option<usize>,
    /// Number of simulated frames
    #[arg(long, default_value_t = 600)]
    pub frames: u32,
    /// Camera speed in world units per second
    #[arg(long, default_value_t = 48.0)]
    pub speed: f32,
    /// Camera height above the ground
    #[arg(long, default_value_t = 30.0)]
    pub altitude: f32,
    /// Simulated frame time in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub dt: f32,
    /// Sleep for `dt` every frame instead of running flat out
    #[arg(long)]
    pub realtime: bool,
}

impl Args {
    /// Applies command-line overrides on top of the loaded config.
    pub fn apply(&self, cfg: &mut TerrainConfig) {
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
        if let Some(view) = self.view {
            cfg.stream.view_distance_chunks = view;
        }
        if let Some(workers) = self.workers {
            cfg.workers.count = Some(workers);
        }
    }

    pub fn flight_plan(&self) -> FlightPlan {
        FlightPlan {
            frames: self.frames,
            speed: self.speed,
            altitude: self.altitude,
            dt: self.dt.max(0.0),
            realtime: self.realtime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_config_values() {
        let args = Args::try_parse_from([
            "vista", "--seed", "89", "--view", "3", "--workers", "2", "--frames", "10",
        ])
        .unwrap();
        let mut cfg = TerrainConfig::default();
        args.apply(&mut cfg);
        assert_eq!(cfg.seed, 89);
        assert_eq!(cfg.stream.view_distance_chunks, 3);
        assert_eq!(cfg.workers.count, Some(2));
        assert_eq!(args.flight_plan().frames, 10);
        assert!(args.config.is_none());
    }

    #[test]
    fn defaults_leave_config_alone() {
        let args = Args::try_parse_from(["vista"]).unwrap();
        let mut cfg = TerrainConfig::default();
        args.apply(&mut cfg);
        assert_eq!(cfg.seed, TerrainConfig::default().seed);
        assert_eq!(cfg.workers.count, None);
        assert!(!args.realtime);
    }
}
