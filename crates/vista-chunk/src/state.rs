use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a tile. The discriminant order is the only legal direction of travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ChunkState {
    Unloaded = 0,
    Generating = 1,
    MeshBuilding = 2,
    Ready = 3,
    Unloading = 4,
}

impl ChunkState {
    #[inline]
    pub fn from_u8(v: u8) -> ChunkState {
        match v {
            0 => ChunkState::Unloaded,
            1 => ChunkState::Generating,
            2 => ChunkState::MeshBuilding,
            3 => ChunkState::Ready,
            _ => ChunkState::Unloading,
        }
    }
}

#[derive(Debug)]
pub(crate) struct AtomicChunkState(AtomicU8);

impl AtomicChunkState {
    pub(crate) fn new(state: ChunkState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    #[inline]
    pub(crate) fn load(&self) -> ChunkState {
        ChunkState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Stores `next` only if it lies strictly ahead of the current state.
    /// Returns the previous state on success, the unchanged current state on refusal.
    pub(crate) fn advance(&self, next: ChunkState) -> Result<ChunkState, ChunkState> {
        let mut current = self.0.load(Ordering::Acquire);
        loop {
            if next as u8 <= current {
                return Err(ChunkState::from_u8(current));
            }
            match self.0.compare_exchange_weak(
                current,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(prev) => return Ok(ChunkState::from_u8(prev)),
                Err(actual) => current = actual,
            }
        }
    }
}
