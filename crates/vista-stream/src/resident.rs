use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hashbrown::HashMap;
use vista_chunk::ChunkMap;
use vista_geom::Vec3;
use vista_world::ChunkCoord;

use crate::raycast::TerrainSurface;

/// The set of resident tiles, shared between the streaming thread and its readers.
///
/// This is the only shared mutable map; the lock is held just long enough to
/// clone an `Arc` in or out.
#[derive(Debug, Default)]
pub struct ResidentChunks {
    map: Mutex<HashMap<ChunkCoord, Arc<ChunkMap>>>,
}

impl ResidentChunks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ChunkCoord, Arc<ChunkMap>>> {
        self.map.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<Arc<ChunkMap>> {
        self.lock().get(&coord).cloned()
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.lock().contains_key(&coord)
    }

    /// Adds `chunk` unless its coordinate is already resident; the existing tile wins.
    pub fn insert(&self, chunk: Arc<ChunkMap>) -> bool {
        let mut map = self.lock();
        match map.entry(chunk.coord()) {
            hashbrown::hash_map::Entry::Occupied(_) => false,
            hashbrown::hash_map::Entry::Vacant(slot) => {
                slot.insert(chunk);
                true
            }
        }
    }

    pub fn remove(&self, coord: ChunkCoord) -> Option<Arc<ChunkMap>> {
        self.lock().remove(&coord)
    }

    /// Removes every tile for which `evict` returns true and hands them back.
    pub fn remove_where<F>(&self, mut evict: F) -> Vec<Arc<ChunkMap>>
    where
        F: FnMut(&ChunkMap) -> bool,
    {
        let mut out = Vec::new();
        self.lock().retain(|_, chunk| {
            if evict(chunk) {
                out.push(Arc::clone(chunk));
                false
            } else {
                true
            }
        });
        out
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Point-in-time copy of every resident tile.
    pub fn snapshot(&self) -> Vec<Arc<ChunkMap>> {
        self.lock().values().cloned().collect()
    }

    pub fn coords(&self) -> Vec<ChunkCoord> {
        self.lock().keys().copied().collect()
    }

    /// Tile owning world XZ, if it is resident and `Ready`.
    pub fn ready_at(&self, x: f32, z: f32) -> Option<Arc<ChunkMap>> {
        self.get(ChunkCoord::from_world(x, z))
            .filter(|chunk| chunk.is_ready())
    }
}

impl TerrainSurface for ResidentChunks {
    fn surface_height(&self, x: f32, z: f32) -> Option<f32> {
        let chunk = self.ready_at(x, z)?;
        let (ox, oz) = chunk.origin();
        Some(chunk.height_at(x - ox, z - oz))
    }

    fn surface_normal(&self, x: f32, z: f32) -> Vec3 {
        match self.ready_at(x, z) {
            Some(chunk) => {
                let (ox, oz) = chunk.origin();
                chunk.normal_at(x - ox, z - oz)
            }
            None => Vec3::UP,
        }
    }
}
