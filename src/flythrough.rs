use std::time::{Duration, Instant};

use vista_chunk::HeadlessMeshBackend;
use vista_geom::{Ray, Vec3};
use vista_stream::TerrainManager;

/// Frames between progress lines.
const REPORT_EVERY: u32 = 120;

#[derive(Clone, Copy, Debug)]
pub struct FlightPlan {
    pub frames: u32,
    pub speed: f32,
    pub altitude: f32,
    pub dt: f32,
    pub realtime: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FlightStats {
    pub frames: u32,
    pub requested: usize,
    pub completed: usize,
    pub evicted: usize,
    pub lod_changes: usize,
    pub peak_resident: usize,
    pub peak_pending: usize,
    pub distance: f32,
}

/// Camera position after `t` seconds: a long curve out of the spawn area.
fn camera_at(t: f32, speed: f32) -> (f32, f32) {
    let s = t * speed;
    (s, 96.0 * (s / 400.0).sin())
}

/// Flies the camera along a fixed path, driving `manager` once per frame.
pub fn run(
    manager: &mut TerrainManager,
    backend: &HeadlessMeshBackend,
    plan: &FlightPlan,
) -> FlightStats {
    let mut stats = FlightStats::default();
    let started = Instant::now();
    let mut prev = Vec3::ZERO;

    for frame in 0..plan.frames {
        let t = frame as f32 * plan.dt;
        let (x, z) = camera_at(t, plan.speed);
        let camera = Vec3::new(x, manager.height_at(x, z) + plan.altitude, z);

        let report = manager.update(camera, plan.dt);
        stats.frames += 1;
        stats.requested += report.requested;
        stats.completed += report.completed;
        stats.evicted += report.evicted;
        stats.lod_changes += report.lod_changes;
        stats.peak_resident = stats.peak_resident.max(manager.resident_count());
        stats.peak_pending = stats.peak_pending.max(manager.pending_count());
        if frame > 0 {
            stats.distance += camera.distance_xz(prev);
        }
        prev = camera;

        if frame % REPORT_EVERY == 0 {
            let ground = manager
                .raycast(&Ray::new(camera, Vec3::DOWN), plan.altitude * 4.0)
                .map(|hit| hit.point.y);
            log::info!(
                target: "stream",
                "[frame {}] cam=({:.0}, {:.0}, {:.0}) resident={} pending={} live_meshes={} ground={:?}",
                frame,
                camera.x,
                camera.y,
                camera.z,
                manager.resident_count(),
                manager.pending_count(),
                backend.live_meshes(),
                ground
            );
        }
        if plan.realtime {
            std::thread::sleep(Duration::from_secs_f32(plan.dt));
        }
    }

    log::info!(
        target: "perf",
        "flight_ms={} frames={} generated={} uploads={} upload_bytes={}",
        started.elapsed().as_millis(),
        stats.frames,
        manager.generator().generated_count(),
        backend.total_uploads(),
        backend.total_bytes()
    );
    stats
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vista_chunk::MeshBackend;
    use vista_world::TerrainConfig;

    use super::*;

    #[test]
    fn path_starts_at_spawn_and_moves_forward() {
        assert_eq!(camera_at(0.0, 48.0), (0.0, 0.0));
        let (x1, _) = camera_at(1.0, 48.0);
        let (x2, _) = camera_at(2.0, 48.0);
        assert!(x2 > x1 && x1 > 0.0);
    }

    #[test]
    fn short_flight_streams_tiles() {
        let mut cfg = TerrainConfig::default();
        cfg.stream.view_distance_chunks = 1;
        cfg.workers.count = Some(1);
        let headless = Arc::new(HeadlessMeshBackend::new());
        let backend: Arc<dyn MeshBackend> = headless.clone();
        let mut manager = TerrainManager::from_config(&cfg, backend).unwrap();
        let plan = FlightPlan {
            frames: 20,
            speed: 48.0,
            altitude: 30.0,
            dt: 1.0 / 60.0,
            realtime: false,
        };
        let stats = run(&mut manager, &headless, &plan);
        assert_eq!(stats.frames, 20);
        assert!(stats.requested >= 5);
        assert!(stats.peak_pending > 0);
        assert!(stats.distance > 0.0);
    }
}
