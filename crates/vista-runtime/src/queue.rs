use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::Arc;

use vista_chunk::ChunkMap;
use vista_world::ChunkCoord;

/// Invoked exactly once on a worker thread with the finished tile.
pub type CompletionCallback = Box<dyn FnOnce(Arc<ChunkMap>) + Send + 'static>;

/// One tile to synthesize. Smaller `priority` is served first.
pub struct TerrainGenerationRequest {
    pub coord: ChunkCoord,
    pub priority: f32,
    pub callback: CompletionCallback,
}

impl TerrainGenerationRequest {
    pub fn new<F>(coord: ChunkCoord, priority: f32, callback: F) -> Self
    where
        F: FnOnce(Arc<ChunkMap>) + Send + 'static,
    {
        Self {
            coord,
            priority,
            callback: Box::new(callback),
        }
    }
}

impl fmt::Debug for TerrainGenerationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerrainGenerationRequest")
            .field("coord", &self.coord)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

struct Queued {
    seq: u64,
    request: TerrainGenerationRequest,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    // BinaryHeap is a max-heap: invert so the smallest priority, then the oldest, pops first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .request
            .priority
            .total_cmp(&self.request.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority request heap. Not synchronized; the generator wraps it in a mutex.
#[derive(Default)]
pub(crate) struct RequestQueue {
    heap: BinaryHeap<Queued>,
    next_seq: u64,
}

impl RequestQueue {
    pub(crate) fn push(&mut self, request: TerrainGenerationRequest) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.heap.push(Queued { seq, request });
    }

    pub(crate) fn pop(&mut self) -> Option<TerrainGenerationRequest> {
        self.heap.pop().map(|q| q.request)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drops every queued request without running its callback; returns how many there were.
    pub(crate) fn clear(&mut self) -> usize {
        let n = self.heap.len();
        self.heap.clear();
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(x: i32, priority: f32) -> TerrainGenerationRequest {
        TerrainGenerationRequest::new(ChunkCoord::new(x, 0), priority, |_| {})
    }

    fn drain(q: &mut RequestQueue) -> Vec<i32> {
        std::iter::from_fn(|| q.pop()).map(|r| r.coord.x).collect()
    }

    #[test]
    fn nearest_first() {
        let mut q = RequestQueue::default();
        q.push(req(0, 50.0));
        q.push(req(1, 0.0));
        q.push(req(2, 12.5));
        q.push(req(3, f32::INFINITY));
        assert_eq!(q.len(), 4);
        assert_eq!(drain(&mut q), vec![1, 2, 0, 3]);
        assert!(q.is_empty());
    }

    #[test]
    fn ties_pop_in_arrival_order() {
        let mut q = RequestQueue::default();
        for x in 0..5 {
            q.push(req(x, 7.0));
        }
        assert_eq!(drain(&mut q), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn nan_priority_sorts_last() {
        let mut q = RequestQueue::default();
        q.push(req(0, f32::NAN));
        q.push(req(1, 1.0e9));
        assert_eq!(drain(&mut q), vec![1, 0]);
    }

    #[test]
    fn clear_drops_without_callbacks() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let hits = Arc::new(AtomicUsize::new(0));
        let mut q = RequestQueue::default();
        for x in 0..3 {
            let hits = Arc::clone(&hits);
            q.push(TerrainGenerationRequest::new(
                ChunkCoord::new(x, x),
                x as f32,
                move |_| {
                    hits.fetch_add(1, Ordering::SeqCst);
                },
            ));
        }
        assert_eq!(q.clear(), 3);
        assert!(q.pop().is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
