mod cli;
mod flythrough;

use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use vista_chunk::{HeadlessMeshBackend, MeshBackend};
use vista_stream::TerrainManager;
use vista_world::{TerrainConfig, load_config_from_path};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = cli::Args::parse();

    let mut cfg = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => TerrainConfig::default(),
    };
    args.apply(&mut cfg);
    cfg.validate()?;

    let headless = Arc::new(HeadlessMeshBackend::new());
    let backend: Arc<dyn MeshBackend> = headless.clone();
    let mut manager = TerrainManager::from_config(&cfg, backend)?;
    log::info!(
        "flying {} frames at {:.0} u/s (seed={}, workers={})",
        args.frames,
        args.speed,
        cfg.seed,
        manager.generator().worker_count()
    );

    let stats = flythrough::run(&mut manager, &headless, &args.flight_plan());
    log::info!(
        "done: {} frames, {:.0} units flown, requested={} completed={} evicted={} lod_changes={} peak_resident={} peak_pending={}",
        stats.frames,
        stats.distance,
        stats.requested,
        stats.completed,
        stats.evicted,
        stats.lod_changes,
        stats.peak_resident,
        stats.peak_pending
    );

    drop(manager);
    log::info!("live meshes after shutdown: {}", headless.live_meshes());
    Ok(())
}
