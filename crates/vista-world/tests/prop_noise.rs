use std::sync::Arc;

use proptest::prelude::*;
use vista_world::noise::{fbm_2d, value_noise_2d};
use vista_world::{BiomeManager, BiomeTable, FbmParams, LatticeHash, NoiseSource, SpawnSettings};

fn coord() -> impl Strategy<Value = f32> {
    -50_000.0f32..50_000.0
}

proptest! {
    // Value noise stays within the hash range for any position
    #[test]
    fn value_noise_bounded(seed in any::<i32>(), x in coord(), z in coord()) {
        let v = value_noise_2d(&LatticeHash, seed, x, z);
        prop_assert!((-1.0 - 1e-5..=1.0 + 1e-5).contains(&v));
    }

    // fBm is normalized by its amplitude sum
    #[test]
    fn fbm_bounded(
        seed in any::<i32>(),
        x in coord(),
        z in coord(),
        octaves in 0u32..8,
        persistence in 0.1f32..0.9,
        lacunarity in 1.5f32..3.0,
    ) {
        let params = FbmParams { frequency: 0.01, octaves, persistence, lacunarity };
        let v = fbm_2d(&LatticeHash, seed, x, z, &params);
        prop_assert!((-1.0 - 1e-4..=1.0 + 1e-4).contains(&v));
    }

    // Hash is a pure function of its inputs
    #[test]
    fn lattice_hash_pure(seed in any::<i32>(), ix in any::<i32>(), iz in any::<i32>()) {
        let n = LatticeHash;
        prop_assert_eq!(n.hash(seed, ix, iz), n.hash(seed, ix, iz));
    }

    // Secondary weight never exceeds one half
    #[test]
    fn biome_secondary_weight_bounded(seed in any::<i32>(), x in coord(), z in coord()) {
        let m = BiomeManager::new(
            Arc::new(BiomeTable::builtin()),
            Arc::new(LatticeHash),
            SpawnSettings::default(),
        );
        let s = m.sample(x, z, seed);
        prop_assert!((0.0..=0.5).contains(&s.secondary_weight));
        if s.primary == s.secondary {
            prop_assert_eq!(s.secondary_weight, 0.0);
        }
    }
}
