use std::sync::Arc;
use std::time::Duration;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use vista_chunk::{HeadlessMeshBackend, MeshBackend};
use vista_runtime::ChunkSynth;
use vista_world::{BiomeManager, BiomeTable, ChunkCoord, LatticeHash, SpawnSettings};

fn make_synth(resolution: usize) -> ChunkSynth {
    let biomes = Arc::new(BiomeManager::new(
        Arc::new(BiomeTable::builtin()),
        Arc::new(LatticeHash),
        SpawnSettings::default(),
    ));
    ChunkSynth::new(biomes, 1337, resolution)
}

fn bench_generate_tile(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_tile");
    let backend: Arc<dyn MeshBackend> = Arc::new(HeadlessMeshBackend::new());
    for res in [16usize, 32] {
        let synth = make_synth(res);
        group.bench_function(format!("res_{res}"), |b| {
            b.iter(|| {
                let map = synth.generate(black_box(ChunkCoord::new(9, -4)), &backend);
                black_box(map.index_count())
            })
        });
    }
    group.finish();
}

fn bench_padded_heights(c: &mut Criterion) {
    let synth = make_synth(32);
    c.bench_function("padded_heights_res_32", |b| {
        b.iter(|| black_box(synth.padded_heights(black_box(ChunkCoord::new(-20, 31)))))
    });
}

fn config() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(5))
}

criterion_group! {
    name = benches;
    config = config();
    targets = bench_generate_tile, bench_padded_heights
}
criterion_main!(benches);
