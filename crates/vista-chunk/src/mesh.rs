//! CPU-side terrain mesh built from a heightfield.

use vista_geom::{Aabb, Vec3};

use crate::heightfield::Heightfield;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Tile-local, `[0, 1]` across the tile.
    pub uv: [f32; 2],
}

#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn byte_size(&self) -> usize {
        self.vertices.len() * std::mem::size_of::<Vertex>()
            + self.indices.len() * std::mem::size_of::<u32>()
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|v| Vec3::from(v.position)))
    }
}

/// Normals for every lattice point of a `resolution` grid, computed from a
/// sample grid padded by one extra ring (`(resolution + 3)²` samples).
/// Using the padding keeps normals continuous across tile borders.
pub fn central_difference_normals(padded: &[f32], resolution: usize, step: f32) -> Vec<Vec3> {
    let side = resolution + 1;
    let pside = resolution + 3;
    debug_assert_eq!(padded.len(), pside * pside);
    let at = |k: usize, j: usize| padded[j * pside + k];
    let mut out = Vec::with_capacity(side * side);
    for j in 0..side {
        for k in 0..side {
            let (pk, pj) = (k + 1, j + 1);
            let dx = at(pk + 1, pj) - at(pk - 1, pj);
            let dz = at(pk, pj + 1) - at(pk, pj - 1);
            out.push(Vec3::new(-dx, 2.0 * step, -dz).normalized());
        }
    }
    out
}

/// Lattice indices kept at `lod`: every `2^lod`-th sample plus the far edge.
fn lod_lattice(resolution: usize, lod: u8) -> Vec<usize> {
    let stride = (1usize << lod.min(7)).min(resolution).max(1);
    let mut out: Vec<usize> = (0..=resolution).step_by(stride).collect();
    if out.last() != Some(&resolution) {
        out.push(resolution);
    }
    out
}

/// Triangulates `heights` with world-space positions. `normals` must hold one
/// entry per lattice point; otherwise normals are derived from the heightfield.
pub fn build_terrain_mesh(
    heights: &Heightfield,
    normals: &[Vec3],
    origin: (f32, f32),
    lod: u8,
) -> MeshData {
    let res = heights.resolution();
    let step = heights.step();
    let lattice = lod_lattice(res, lod);
    let n = lattice.len();
    let have_normals = normals.len() == heights.side() * heights.side();

    let mut vertices = Vec::with_capacity(n * n);
    for &j in &lattice {
        for &k in &lattice {
            let lx = k as f32 * step;
            let lz = j as f32 * step;
            let normal = if have_normals {
                normals[heights.idx(k, j)]
            } else {
                heights.normal_at(lx, lz)
            };
            vertices.push(Vertex {
                position: [origin.0 + lx, heights.get(k, j), origin.1 + lz],
                normal: normal.to_array(),
                uv: [k as f32 / res as f32, j as f32 / res as f32],
            });
        }
    }

    let mut indices = Vec::with_capacity((n - 1) * (n - 1) * 6);
    for row in 0..n - 1 {
        for col in 0..n - 1 {
            let i0 = (row * n + col) as u32;
            let i1 = i0 + 1;
            let i2 = i0 + n as u32;
            let i3 = i2 + 1;
            // counter-clockwise seen from +y
            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }

    MeshData { vertices, indices }
}
