use serde::{Deserialize, Serialize};
use vista_geom::Vec3;

use crate::CHUNK_SIZE_F;

/// Tile identity on the XZ plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Tile owning the world position. Floors, so `-0.5` belongs to tile `-1`.
    #[inline]
    pub fn from_world(wx: f32, wz: f32) -> Self {
        Self {
            x: (wx / CHUNK_SIZE_F).floor() as i32,
            z: (wz / CHUNK_SIZE_F).floor() as i32,
        }
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            z: self.z.saturating_add(dz),
        }
    }

    /// World-space corner with the smallest x and z.
    #[inline]
    pub fn origin(self) -> (f32, f32) {
        (self.x as f32 * CHUNK_SIZE_F, self.z as f32 * CHUNK_SIZE_F)
    }

    /// World-space centre on the ground plane (y = 0).
    #[inline]
    pub fn center(self) -> Vec3 {
        let (ox, oz) = self.origin();
        Vec3::new(ox + CHUNK_SIZE_F * 0.5, 0.0, oz + CHUNK_SIZE_F * 0.5)
    }

    /// Saturates at `i32::MAX` for coordinates at opposite ends of the range.
    #[inline]
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        let dx = (i64::from(self.x) - i64::from(other.x)).abs();
        let dz = (i64::from(self.z) - i64::from(other.z)).abs();
        i32::try_from(dx.max(dz)).unwrap_or(i32::MAX)
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dz = i64::from(self.z) - i64::from(other.z);
        dx.saturating_mul(dx).saturating_add(dz.saturating_mul(dz))
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.x, value.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn far_positions_do_not_overflow() {
        let edge = ChunkCoord::from_world(1.0e12, -1.0e12);
        assert_eq!(edge, ChunkCoord::new(i32::MAX, i32::MIN));
        assert_eq!(edge.offset(1, -1), edge);
        assert_eq!(edge.offset(-1, 1), ChunkCoord::new(i32::MAX - 1, i32::MIN + 1));
        let origin = ChunkCoord::new(0, 0);
        assert_eq!(edge.chebyshev(ChunkCoord::new(i32::MIN, i32::MAX)), i32::MAX);
        assert_eq!(edge.chebyshev(origin), i32::MAX);
        assert_eq!(origin.distance_sq(ChunkCoord::new(3, -4)), 25);
        assert!(edge.distance_sq(origin) > 0);
    }

    #[test]
    fn floors_negative_positions() {
        assert_eq!(ChunkCoord::from_world(-0.5, 31.9), ChunkCoord::new(-1, 0));
        assert_eq!(ChunkCoord::from_world(32.0, -32.0), ChunkCoord::new(1, -1));
    }
}
