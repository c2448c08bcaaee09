use vista_chunk::LOD_LEVELS;

/// Distance bands for render LOD. `thresholds[i]` is the exclusive upper
/// distance of level `i`; anything farther than the last one is the coarsest level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodBands {
    thresholds: [f32; 4],
}

impl Default for LodBands {
    fn default() -> Self {
        Self {
            thresholds: [64.0, 128.0, 192.0, 256.0],
        }
    }
}

impl LodBands {
    /// `thresholds` are expected ascending; config validation enforces it.
    pub fn new(thresholds: [f32; 4]) -> Self {
        Self { thresholds }
    }

    #[inline]
    pub fn thresholds(&self) -> [f32; 4] {
        self.thresholds
    }

    pub fn level_for(&self, distance: f32) -> u8 {
        self.thresholds
            .iter()
            .position(|t| distance < *t)
            .map_or(LOD_LEVELS - 1, |i| i as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_split_at_thresholds() {
        let bands = LodBands::default();
        assert_eq!(bands.level_for(0.0), 0);
        assert_eq!(bands.level_for(63.9), 0);
        assert_eq!(bands.level_for(64.0), 1);
        assert_eq!(bands.level_for(200.0), 3);
        assert_eq!(bands.level_for(256.0), 4);
        assert_eq!(bands.level_for(f32::INFINITY), 4);
        assert_eq!(bands.level_for(f32::NAN), 4);
    }
}
