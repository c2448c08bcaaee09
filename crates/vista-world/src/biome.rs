use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::noise::FbmParams;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BiomeType {
    Plains = 0,
    Hills = 1,
    Mountains = 2,
    Desert = 3,
    Tundra = 4,
    Swamp = 5,
    Spawn = 6,
}

impl BiomeType {
    /// Biomes reachable through Worley classification; `Spawn` is placed by radius only.
    pub const SELECTABLE: [BiomeType; 6] = [
        BiomeType::Plains,
        BiomeType::Hills,
        BiomeType::Mountains,
        BiomeType::Desert,
        BiomeType::Tundra,
        BiomeType::Swamp,
    ];

    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<BiomeType> {
        match id {
            0 => Some(BiomeType::Plains),
            1 => Some(BiomeType::Hills),
            2 => Some(BiomeType::Mountains),
            3 => Some(BiomeType::Desert),
            4 => Some(BiomeType::Tundra),
            5 => Some(BiomeType::Swamp),
            6 => Some(BiomeType::Spawn),
            _ => None,
        }
    }

    /// Picks a selectable biome from a feature value in `[0, 1)`.
    pub fn from_feature(value: f32) -> BiomeType {
        let n = Self::SELECTABLE.len();
        let idx = ((value.max(0.0) * n as f32) as usize).min(n - 1);
        Self::SELECTABLE[idx]
    }

    pub fn name(self) -> &'static str {
        match self {
            BiomeType::Plains => "plains",
            BiomeType::Hills => "hills",
            BiomeType::Mountains => "mountains",
            BiomeType::Desert => "desert",
            BiomeType::Tundra => "tundra",
            BiomeType::Swamp => "swamp",
            BiomeType::Spawn => "spawn",
        }
    }
}

/// Immutable shaping and appearance parameters for one biome.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeDefinition {
    pub base_height: f32,
    pub height_variation: f32,
    pub frequency: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
    pub surface_color: [f32; 3],
    pub slope_color: [f32; 3],
    /// Width in world units of the cross-fade band at this biome's borders.
    pub blend_width: f32,
}

impl Default for BiomeDefinition {
    fn default() -> Self {
        Self {
            base_height: 20.0,
            height_variation: 8.0,
            frequency: 0.01,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            surface_color: [0.36, 0.55, 0.25],
            slope_color: [0.45, 0.40, 0.33],
            blend_width: 48.0,
        }
    }
}

impl BiomeDefinition {
    #[inline]
    pub fn fbm(&self) -> FbmParams {
        FbmParams {
            frequency: self.frequency,
            octaves: self.octaves,
            persistence: self.persistence,
            lacunarity: self.lacunarity,
        }
    }

    fn builtin(biome: BiomeType) -> Self {
        let d = BiomeDefinition::default();
        match biome {
            BiomeType::Plains => d,
            BiomeType::Hills => BiomeDefinition {
                base_height: 32.0,
                height_variation: 22.0,
                frequency: 0.012,
                octaves: 5,
                surface_color: [0.30, 0.50, 0.22],
                ..d
            },
            BiomeType::Mountains => BiomeDefinition {
                base_height: 60.0,
                height_variation: 70.0,
                frequency: 0.008,
                octaves: 6,
                persistence: 0.55,
                lacunarity: 2.1,
                surface_color: [0.52, 0.50, 0.48],
                slope_color: [0.35, 0.33, 0.32],
                blend_width: 96.0,
            },
            BiomeType::Desert => BiomeDefinition {
                base_height: 18.0,
                height_variation: 10.0,
                frequency: 0.006,
                octaves: 3,
                persistence: 0.45,
                surface_color: [0.86, 0.76, 0.52],
                slope_color: [0.76, 0.62, 0.40],
                ..d
            },
            BiomeType::Tundra => BiomeDefinition {
                base_height: 26.0,
                height_variation: 12.0,
                frequency: 0.009,
                surface_color: [0.90, 0.92, 0.95],
                slope_color: [0.60, 0.62, 0.66],
                ..d
            },
            BiomeType::Swamp => BiomeDefinition {
                base_height: 10.0,
                height_variation: 3.0,
                frequency: 0.02,
                octaves: 3,
                surface_color: [0.25, 0.35, 0.20],
                slope_color: [0.30, 0.28, 0.20],
                blend_width: 32.0,
                ..d
            },
            BiomeType::Spawn => BiomeDefinition {
                base_height: 20.0,
                height_variation: 0.0,
                octaves: 0,
                surface_color: [0.40, 0.60, 0.30],
                blend_width: 0.0,
                ..d
            },
        }
    }
}

/// Read-only lookup handed to everything that needs biome parameters.
#[derive(Clone, Debug)]
pub struct BiomeTable {
    defs: HashMap<BiomeType, BiomeDefinition>,
    fallback: BiomeDefinition,
}

impl BiomeTable {
    /// Table with no entries; every lookup returns `fallback`.
    pub fn empty(fallback: BiomeDefinition) -> Self {
        Self {
            defs: HashMap::new(),
            fallback,
        }
    }

    pub fn builtin() -> Self {
        let mut table = Self::empty(BiomeDefinition::default());
        for biome in BiomeType::SELECTABLE
            .into_iter()
            .chain(std::iter::once(BiomeType::Spawn))
        {
            table.defs.insert(biome, BiomeDefinition::builtin(biome));
        }
        table
    }

    pub fn with(mut self, biome: BiomeType, def: BiomeDefinition) -> Self {
        self.defs.insert(biome, def);
        self
    }

    #[inline]
    pub fn get(&self, biome: BiomeType) -> &BiomeDefinition {
        self.defs.get(&biome).unwrap_or(&self.fallback)
    }

    /// Unknown ids resolve to the fallback definition.
    #[inline]
    pub fn get_by_id(&self, id: u8) -> &BiomeDefinition {
        match BiomeType::from_id(id) {
            Some(b) => self.get(b),
            None => &self.fallback,
        }
    }

    #[inline]
    pub fn fallback(&self) -> &BiomeDefinition {
        &self.fallback
    }

    pub fn contains(&self, biome: BiomeType) -> bool {
        self.defs.contains_key(&biome)
    }
}

impl Default for BiomeTable {
    fn default() -> Self {
        Self::builtin()
    }
}
