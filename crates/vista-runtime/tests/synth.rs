use std::sync::Arc;

use vista_chunk::{ChunkState, HeadlessMeshBackend, MeshBackend};
use vista_runtime::ChunkSynth;
use vista_world::{BiomeManager, BiomeTable, BiomeType, ChunkCoord, LatticeHash, SpawnSettings};

fn synth(seed: i32, resolution: usize) -> ChunkSynth {
    let biomes = Arc::new(BiomeManager::new(
        Arc::new(BiomeTable::builtin()),
        Arc::new(LatticeHash),
        SpawnSettings::default(),
    ));
    ChunkSynth::new(biomes, seed, resolution)
}

fn backend() -> Arc<dyn MeshBackend> {
    Arc::new(HeadlessMeshBackend::new())
}

#[test]
fn generated_tile_is_ready_with_mesh() {
    let s = synth(89, 16);
    let map = s.generate(ChunkCoord::new(4, -7), &backend());
    assert_eq!(map.state(), ChunkState::Ready);
    assert_eq!(map.heightfield().resolution(), 16);
    assert_eq!(map.index_count(), 16 * 16 * 6);
    let b = map.bounds();
    assert_eq!((b.min.x, b.min.z), (128.0, -224.0));
    assert!(b.max.y >= b.min.y);
}

#[test]
fn generation_is_deterministic() {
    let a = synth(89, 8).generate(ChunkCoord::new(12, 3), &backend());
    let b = synth(89, 8).generate(ChunkCoord::new(12, 3), &backend());
    assert_eq!(a.heightfield(), b.heightfield());
    assert_eq!(a.biome(), b.biome());
    let c = synth(90, 8).generate(ChunkCoord::new(12, 3), &backend());
    assert_ne!(a.heightfield(), c.heightfield());
}

#[test]
fn neighbouring_tiles_share_edges() {
    let s = synth(42, 32);
    let be = backend();
    let left = s.generate(ChunkCoord::new(6, 2), &be);
    let right = s.generate(ChunkCoord::new(7, 2), &be);
    let below = s.generate(ChunkCoord::new(6, 3), &be);
    let hl = left.heightfield();
    for j in 0..hl.side() {
        assert_eq!(hl.get(32, j), right.heightfield().get(0, j));
    }
    for k in 0..hl.side() {
        assert_eq!(hl.get(k, 32), below.heightfield().get(k, 0));
    }
}

#[test]
fn samples_match_height_function() {
    let s = synth(17, 32);
    let coord = ChunkCoord::new(-3, 5);
    let map = s.generate(coord, &backend());
    let (ox, oz) = coord.origin();
    for (k, j) in [(0, 0), (5, 9), (32, 32), (17, 0)] {
        let expect = s.height_at(ox + k as f32, oz + j as f32);
        assert_eq!(map.heightfield().get(k, j), expect);
        assert_eq!(map.height_at(k as f32, j as f32), expect);
    }
}

#[test]
fn spawn_crater_and_biome() {
    let s = synth(89, 8);
    let spawn = *s.biomes().spawn();
    let base = s.biomes().definition(BiomeType::Spawn).base_height;
    assert_eq!(s.height_at(spawn.center_x, spawn.center_z), base - spawn.crater_depth);
    // crater floor rises toward the rim
    assert!(s.height_at(12.0, 0.0) > s.height_at(4.0, 0.0));
    // outside the safe radius only the natural terrain remains
    let far = spawn.safe_radius + 10.0;
    assert_eq!(s.height_at(far, 0.0), s.natural_height(far, 0.0));
    let map = s.generate(ChunkCoord::new(0, 0), &backend());
    assert_eq!(map.biome(), BiomeType::Spawn);
}

#[test]
fn padded_grid_has_one_extra_ring() {
    let s = synth(1, 4);
    let padded = s.padded_heights(ChunkCoord::new(10, 10));
    assert_eq!(padded.len(), 7 * 7);
    // index (1, 1) is the tile origin
    assert_eq!(padded[7 + 1], s.height_at(320.0, 320.0));
    assert_eq!(padded[0], s.height_at(312.0, 312.0));
}
