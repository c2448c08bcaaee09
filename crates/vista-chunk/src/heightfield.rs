use vista_geom::Vec3;

/// Regular `(resolution + 1)²` grid of elevations covering `extent` world units,
/// stored row-major with z as the row.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightfield {
    resolution: usize,
    step: f32,
    extent: f32,
    samples: Vec<f32>,
}

/// Half-width of the central-difference stencil used for normals.
const NORMAL_EPS: f32 = 0.5;
/// Grid coordinates this close to an integer are treated as lying on the lattice.
const LATTICE_SNAP: f32 = 1e-4;

impl Heightfield {
    /// Flat field at height 0.
    pub fn flat(resolution: usize, extent: f32) -> Self {
        let resolution = resolution.max(1);
        let side = resolution + 1;
        Self {
            resolution,
            step: extent / resolution as f32,
            extent,
            samples: vec![0.0; side * side],
        }
    }

    /// Wraps `samples`, padding with zeros or truncating to the exact grid length.
    pub fn from_samples(resolution: usize, extent: f32, samples: Vec<f32>) -> Self {
        let resolution = resolution.max(1);
        let side = resolution + 1;
        let mut s = samples;
        if s.len() != side * side {
            log::warn!(
                target: "terrain",
                "heightfield expected {} samples for resolution {}, got {}; resizing",
                side * side,
                resolution,
                s.len()
            );
            s.resize(side * side, 0.0);
        }
        Self {
            resolution,
            step: extent / resolution as f32,
            extent,
            samples: s,
        }
    }

    #[inline]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Samples per side.
    #[inline]
    pub fn side(&self) -> usize {
        self.resolution + 1
    }

    /// World units between neighbouring samples.
    #[inline]
    pub fn step(&self) -> f32 {
        self.step
    }

    #[inline]
    pub fn extent(&self) -> f32 {
        self.extent
    }

    #[inline]
    pub fn idx(&self, k: usize, j: usize) -> usize {
        j * self.side() + k
    }

    /// Stored sample at column `k`, row `j`.
    #[inline]
    pub fn get(&self, k: usize, j: usize) -> f32 {
        self.samples[self.idx(k, j)]
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn min_max(&self) -> (f32, f32) {
        self.samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            })
    }

    /// Bilinear height at tile-local coordinates, clamped to the grid.
    pub fn height_at(&self, local_x: f32, local_z: f32) -> f32 {
        let (k0, fx) = self.cell(local_x);
        let (j0, fz) = self.cell(local_z);
        let h00 = self.get(k0, j0);
        let h10 = self.get(k0 + 1, j0);
        let h01 = self.get(k0, j0 + 1);
        let h11 = self.get(k0 + 1, j0 + 1);
        // weighted-sum form keeps lattice samples exact
        h00 * (1.0 - fx) * (1.0 - fz)
            + h10 * fx * (1.0 - fz)
            + h01 * (1.0 - fx) * fz
            + h11 * fx * fz
    }

    /// Unit normal from a ±0.5 unit central difference of the interpolated surface.
    pub fn normal_at(&self, local_x: f32, local_z: f32) -> Vec3 {
        let dx = self.height_at(local_x + NORMAL_EPS, local_z)
            - self.height_at(local_x - NORMAL_EPS, local_z);
        let dz = self.height_at(local_x, local_z + NORMAL_EPS)
            - self.height_at(local_x, local_z - NORMAL_EPS);
        Vec3::new(-dx, 2.0 * NORMAL_EPS, -dz).normalized()
    }

    /// Lower lattice index and fractional offset along one axis, clamped so
    /// that `index + 1` is always valid.
    #[inline]
    fn cell(&self, local: f32) -> (usize, f32) {
        let res = self.resolution as f32;
        let g = if local.is_nan() {
            0.0
        } else {
            let g = (local / self.step).clamp(0.0, res);
            let r = g.round();
            if (g - r).abs() <= LATTICE_SNAP { r } else { g }
        };
        let i = (g.floor() as usize).min(self.resolution - 1);
        (i, g - i as f32)
    }
}
