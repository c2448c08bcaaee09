use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::mesh::MeshData;

/// Opaque id of one backend buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshBuffers {
    pub vertex: BufferId,
    pub index: BufferId,
}

/// The render side of the world: owns GPU (or stand-in) buffers addressed by id.
pub trait MeshBackend: Send + Sync {
    fn upload(&self, mesh: &MeshData) -> MeshBuffers;
    fn release(&self, buffers: MeshBuffers);
}

/// Exclusive owner of one uploaded mesh; releases its buffers when dropped.
pub struct MeshHandle {
    buffers: MeshBuffers,
    index_count: u32,
    backend: Arc<dyn MeshBackend>,
}

impl MeshHandle {
    pub fn upload(backend: &Arc<dyn MeshBackend>, mesh: &MeshData) -> Self {
        Self {
            buffers: backend.upload(mesh),
            index_count: mesh.index_count(),
            backend: Arc::clone(backend),
        }
    }

    #[inline]
    pub fn vertex_buffer(&self) -> BufferId {
        self.buffers.vertex
    }

    #[inline]
    pub fn index_buffer(&self) -> BufferId {
        self.buffers.index
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

impl Drop for MeshHandle {
    fn drop(&mut self) {
        self.backend.release(self.buffers);
    }
}

impl fmt::Debug for MeshHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshHandle")
            .field("buffers", &self.buffers)
            .field("index_count", &self.index_count)
            .finish()
    }
}

/// Backend with no GPU behind it; hands out ids and keeps counters.
#[derive(Debug, Default)]
pub struct HeadlessMeshBackend {
    next_id: AtomicU64,
    live: AtomicUsize,
    uploads: AtomicU64,
    bytes: AtomicU64,
}

impl HeadlessMeshBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Meshes uploaded and not yet released.
    pub fn live_meshes(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    pub fn total_uploads(&self) -> u64 {
        self.uploads.load(Ordering::Relaxed)
    }

    pub fn total_bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}

impl MeshBackend for HeadlessMeshBackend {
    fn upload(&self, mesh: &MeshData) -> MeshBuffers {
        let base = self.next_id.fetch_add(2, Ordering::Relaxed);
        self.live.fetch_add(1, Ordering::AcqRel);
        self.uploads.fetch_add(1, Ordering::Relaxed);
        self.bytes
            .fetch_add(mesh.byte_size() as u64, Ordering::Relaxed);
        MeshBuffers {
            vertex: BufferId(base),
            index: BufferId(base + 1),
        }
    }

    fn release(&self, _buffers: MeshBuffers) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}
