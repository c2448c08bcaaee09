//! Injected lattice-hash service and the value-noise / fBm built on top of it.

use std::sync::Arc;

use fastnoise_lite::{FastNoiseLite, NoiseType};
use serde::Deserialize;

/// Pure lattice hash: identical inputs always give the identical value in `[-1, 1]`.
pub trait NoiseSource: Send + Sync {
    fn hash(&self, seed: i32, ix: i32, iz: i32) -> f32;
}

/// Integer avalanche hash; the default service.
#[derive(Clone, Copy, Debug, Default)]
pub struct LatticeHash;

impl NoiseSource for LatticeHash {
    #[inline]
    fn hash(&self, seed: i32, ix: i32, iz: i32) -> f32 {
        let mut h = (seed as u32)
            ^ (ix as u32).wrapping_mul(0x9E37_79B1)
            ^ (iz as u32).wrapping_mul(0x85EB_CA77);
        h ^= h >> 16;
        h = h.wrapping_mul(0x7FEB_352D);
        h ^= h >> 15;
        h = h.wrapping_mul(0x846C_A68B);
        h ^= h >> 16;
        (h as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

/// FastNoise Lite value noise read exactly on integer lattice points, where it
/// degenerates to its internal coordinate hash.
#[derive(Clone, Copy, Debug, Default)]
pub struct FastNoiseLattice;

impl NoiseSource for FastNoiseLattice {
    fn hash(&self, seed: i32, ix: i32, iz: i32) -> f32 {
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::Value));
        noise.set_frequency(Some(1.0));
        noise.get_noise_2d(ix as f32, iz as f32).clamp(-1.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKind {
    #[default]
    Lattice,
    Fastnoise,
}

impl NoiseKind {
    pub fn build(self) -> Arc<dyn NoiseSource> {
        match self {
            NoiseKind::Lattice => Arc::new(LatticeHash),
            NoiseKind::Fastnoise => Arc::new(FastNoiseLattice),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FbmParams {
    pub frequency: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
}

impl Default for FbmParams {
    fn default() -> Self {
        Self {
            frequency: 0.01,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

#[inline]
fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Smoothstep-interpolated value noise in `[-1, 1]`.
pub fn value_noise_2d<N: NoiseSource + ?Sized>(noise: &N, seed: i32, x: f32, z: f32) -> f32 {
    let x0 = x.floor();
    let z0 = z.floor();
    let ix = x0 as i32;
    let iz = z0 as i32;
    let tx = smoothstep(x - x0);
    let tz = smoothstep(z - z0);
    let v00 = noise.hash(seed, ix, iz);
    let v10 = noise.hash(seed, ix.wrapping_add(1), iz);
    let v01 = noise.hash(seed, ix, iz.wrapping_add(1));
    let v11 = noise.hash(seed, ix.wrapping_add(1), iz.wrapping_add(1));
    lerp(lerp(v00, v10, tx), lerp(v01, v11, tx), tz)
}

/// Classic fBm, normalized by the amplitude sum so the result stays in `[-1, 1]`.
/// Zero octaves yields 0.
pub fn fbm_2d<N: NoiseSource + ?Sized>(
    noise: &N,
    seed: i32,
    x: f32,
    z: f32,
    params: &FbmParams,
) -> f32 {
    let mut amplitude = 1.0f32;
    let mut frequency = params.frequency;
    let mut sum = 0.0f32;
    let mut norm = 0.0f32;
    for octave in 0..params.octaves {
        let octave_seed = seed.wrapping_add((octave as i32).wrapping_mul(1013));
        sum += amplitude * value_noise_2d(noise, octave_seed, x * frequency, z * frequency);
        norm += amplitude;
        amplitude *= params.persistence;
        frequency *= params.lacunarity;
    }
    if norm > 0.0 { sum / norm } else { 0.0 }
}

/// Maps a hash value to `[0, 1)`.
#[inline]
pub fn unit_interval(h: f32) -> f32 {
    ((h + 1.0) * 0.5).clamp(0.0, 1.0 - f32::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_hash_is_pure_and_bounded() {
        let n = LatticeHash;
        for ix in -20..20 {
            for iz in -20..20 {
                let a = n.hash(89, ix, iz);
                assert_eq!(a, n.hash(89, ix, iz));
                assert!((-1.0..=1.0).contains(&a));
            }
        }
        assert_ne!(n.hash(1, 3, 4), n.hash(2, 3, 4));
    }

    #[test]
    fn value_noise_matches_hash_on_lattice() {
        let n = LatticeHash;
        for (ix, iz) in [(0, 0), (-3, 7), (12, -40)] {
            let v = value_noise_2d(&n, 5, ix as f32, iz as f32);
            assert_eq!(v, n.hash(5, ix, iz));
        }
    }

    #[test]
    fn fbm_zero_octaves_is_flat() {
        let params = FbmParams {
            octaves: 0,
            ..FbmParams::default()
        };
        assert_eq!(fbm_2d(&LatticeHash, 1, 10.0, 10.0, &params), 0.0);
    }

    #[test]
    fn unit_interval_excludes_one() {
        assert!(unit_interval(1.0) < 1.0);
        assert_eq!(unit_interval(-1.0), 0.0);
    }
}
