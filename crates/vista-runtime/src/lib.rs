//! Terrain generation workers: a nearest-first request queue drained by a named rayon pool.
#![forbid(unsafe_code)]

mod error;
mod queue;
mod synth;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;

use crossbeam_channel::{Receiver, bounded};
use rayon::{ThreadPool, ThreadPoolBuilder};
use vista_chunk::{ChunkMap, MeshBackend};
use vista_world::{BiomeManager, CHUNK_SIZE, ChunkCoord};

pub use error::GeneratorError;
pub use queue::{CompletionCallback, TerrainGenerationRequest};
pub use synth::ChunkSynth;

use crate::queue::RequestQueue;

#[derive(Clone, Debug)]
pub struct GeneratorSettings {
    pub seed: i32,
    /// `None` picks [`default_worker_count`].
    pub workers: Option<usize>,
    /// Heightfield cells per tile side.
    pub resolution: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            seed: 1337,
            workers: None,
            resolution: CHUNK_SIZE,
        }
    }
}

/// Half the hardware threads, never fewer than two.
pub fn default_worker_count() -> usize {
    let hw = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    (hw / 2).max(2)
}

struct QueueState {
    requests: RequestQueue,
    shutdown: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    wake: Condvar,
    pending: AtomicUsize,
    generated: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct TerrainGenerator {
    shared: Arc<Shared>,
    synth: Arc<ChunkSynth>,
    _pool: ThreadPool,
    // every worker holds a sender; disconnection means all of them have returned
    exit_rx: Receiver<()>,
    workers: usize,
}

impl TerrainGenerator {
    pub fn new(
        biomes: Arc<BiomeManager>,
        backend: Arc<dyn MeshBackend>,
        settings: GeneratorSettings,
    ) -> Result<Self, GeneratorError> {
        let workers = settings
            .workers
            .unwrap_or_else(default_worker_count)
            .max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("vista-terrain-{i}"))
            .panic_handler(|_| log::error!(target: "terrain", "terrain worker panicked"))
            .build()?;

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                requests: RequestQueue::default(),
                shutdown: false,
            }),
            wake: Condvar::new(),
            pending: AtomicUsize::new(0),
            generated: AtomicU64::new(0),
        });
        let synth = Arc::new(ChunkSynth::new(
            biomes,
            settings.seed,
            settings.resolution,
        ));

        let (exit_tx, exit_rx) = bounded::<()>(0);
        for _ in 0..workers {
            let shared = Arc::clone(&shared);
            let synth = Arc::clone(&synth);
            let backend = Arc::clone(&backend);
            let exit_tx = exit_tx.clone();
            pool.spawn(move || {
                worker_loop(&shared, &synth, &backend);
                drop(exit_tx);
            });
        }
        drop(exit_tx);

        log::info!(
            target: "terrain",
            "terrain generator started: workers={} seed={} resolution={}",
            workers,
            settings.seed,
            synth.resolution()
        );
        Ok(Self {
            shared,
            synth,
            _pool: pool,
            exit_rx,
            workers,
        })
    }

    /// Queues one tile. `callback` runs on a worker thread once the tile is `Ready`.
    pub fn request_chunk<F>(&self, coord: ChunkCoord, priority: f32, callback: F)
    where
        F: FnOnce(Arc<ChunkMap>) + Send + 'static,
    {
        self.request_chunks(std::iter::once(TerrainGenerationRequest::new(
            coord, priority, callback,
        )));
    }

    /// Queues a batch under a single lock, so workers always see the whole
    /// batch ordered by priority.
    pub fn request_chunks<I>(&self, batch: I)
    where
        I: IntoIterator<Item = TerrainGenerationRequest>,
    {
        let added = {
            let mut state = self.shared.lock();
            if state.shutdown {
                let dropped = batch.into_iter().count();
                log::warn!(
                    target: "terrain",
                    "dropping {} request(s) submitted after shutdown",
                    dropped
                );
                return;
            }
            let before = state.requests.len();
            for request in batch {
                state.requests.push(request);
            }
            let added = state.requests.len() - before;
            self.shared.pending.fetch_add(added, Ordering::AcqRel);
            added
        };
        if added >= self.workers {
            self.shared.wake.notify_all();
        } else {
            for _ in 0..added {
                self.shared.wake.notify_one();
            }
        }
    }

    /// Advisory only: a queued request for `coord` still runs and still
    /// delivers its callback.
    pub fn cancel_request(&self, coord: ChunkCoord) {
        log::debug!(
            target: "terrain",
            "cancel_request({}, {}) ignored; queued requests are not filtered",
            coord.x,
            coord.z
        );
    }

    /// Accepted requests whose tile has not been generated yet.
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.shared.pending.load(Ordering::Acquire)
    }

    #[inline]
    pub fn generated_count(&self) -> u64 {
        self.shared.generated.load(Ordering::Relaxed)
    }

    /// Requests still waiting for a worker.
    pub fn queued_len(&self) -> usize {
        self.shared.lock().requests.len()
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    #[inline]
    pub fn synth(&self) -> &ChunkSynth {
        &self.synth
    }

    /// Stops the workers and waits for them. Queued requests are dropped
    /// without their callbacks; a tile already being generated is finished
    /// and delivered first. Must not be called from a completion callback.
    pub fn shutdown(&self) {
        let (first, dropped) = {
            let mut state = self.shared.lock();
            let first = !state.shutdown;
            state.shutdown = true;
            (first, state.requests.clear())
        };
        if dropped > 0 {
            self.shared.pending.fetch_sub(dropped, Ordering::AcqRel);
        }
        self.shared.wake.notify_all();
        // no worker ever sends, so this returns once every sender is gone
        let _ = self.exit_rx.recv();
        if first {
            log::info!(
                target: "terrain",
                "terrain generator stopped: generated={} dropped={}",
                self.generated_count(),
                dropped
            );
        }
    }
}

impl Drop for TerrainGenerator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: &Shared, synth: &ChunkSynth, backend: &Arc<dyn MeshBackend>) {
    loop {
        let request = {
            let mut state = shared.lock();
            loop {
                if state.shutdown {
                    return;
                }
                if let Some(request) = state.requests.pop() {
                    break request;
                }
                state = shared
                    .wake
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };
        let TerrainGenerationRequest {
            coord, callback, ..
        } = request;
        // a panicking tile or callback must not take the worker down with it
        let generated = panic::catch_unwind(AssertUnwindSafe(|| synth.generate(coord, backend)));
        let map = match generated {
            Ok(map) => Arc::new(map),
            Err(_) => {
                shared.pending.fetch_sub(1, Ordering::AcqRel);
                log::error!(
                    target: "terrain",
                    "generation of tile ({}, {}) panicked; request dropped",
                    coord.x,
                    coord.z
                );
                continue;
            }
        };
        shared.generated.fetch_add(1, Ordering::Relaxed);
        shared.pending.fetch_sub(1, Ordering::AcqRel);
        if panic::catch_unwind(AssertUnwindSafe(move || callback(map))).is_err() {
            log::error!(
                target: "terrain",
                "completion callback for tile ({}, {}) panicked",
                coord.x,
                coord.z
            );
        }
    }
}
