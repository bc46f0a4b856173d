//! Bounded-concurrency image prefetch queue.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::domain::ports::{ImageFetchPort, LoadedImage};
use crate::infrastructure::cache::MemoTable;

/// Default bound on concurrent image loads.
pub const DEFAULT_MAX_CONCURRENT_LOADS: usize = 10;

struct QueueState {
    pending: VecDeque<String>,
    active_loads: usize,
    draining: bool,
}

/// Advisory image prefetcher.
///
/// Warms the shared image cache without blocking callers. Loads are
/// bounded by a slot counter, queued URLs are deduplicated by membership
/// check, and a URL already cached is never re-queued. A failed load is
/// dropped without re-queueing, caching, or surfacing an error; prefetch
/// never escalates.
///
/// Methods that start loads must run inside a tokio runtime.
pub struct ImagePrefetcher {
    fetcher: Arc<dyn ImageFetchPort>,
    cache: Arc<MemoTable<LoadedImage>>,
    state: Mutex<QueueState>,
    max_concurrent_loads: usize,
}

impl ImagePrefetcher {
    /// Creates a prefetcher draining into the given image cache.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn ImageFetchPort>,
        cache: Arc<MemoTable<LoadedImage>>,
        max_concurrent_loads: usize,
    ) -> Self {
        Self {
            fetcher,
            cache,
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                active_loads: 0,
                draining: false,
            }),
            max_concurrent_loads: max_concurrent_loads.max(1),
        }
    }

    /// Queues a URL for loading.
    ///
    /// No-op when the URL is already cached or already queued.
    pub fn preload(self: &Arc<Self>, url: &str) {
        if self.cache.contains(url) {
            return;
        }

        {
            let mut state = self.state.lock();
            if state.pending.iter().any(|queued| queued == url) {
                return;
            }
            state.pending.push_back(url.to_owned());
        }

        self.drain();
    }

    /// Starts loads while slots are free and the queue is non-empty.
    ///
    /// Every load completion decrements the slot counter and re-invokes
    /// this routine, which is how queued URLs get serviced as slots free
    /// up. The `draining` flag keeps the synchronous body from running
    /// twice over the same queue.
    fn drain(self: &Arc<Self>) {
        let mut state = self.state.lock();
        if state.draining {
            return;
        }
        state.draining = true;

        while state.active_loads < self.max_concurrent_loads {
            let Some(url) = state.pending.pop_front() else {
                break;
            };
            state.active_loads += 1;
            trace!(url = %url, active = state.active_loads, "Starting image load");

            let this = Arc::clone(self);
            tokio::spawn(async move {
                match this.fetcher.fetch_image(&url).await {
                    Ok(img) => {
                        this.cache.insert(&url, img);
                        trace!(url = %url, "Image cached");
                    }
                    Err(reason) => {
                        // Advisory load: drop it, free the slot.
                        debug!(url = %url, reason, "Image prefetch failed");
                    }
                }

                {
                    let mut state = this.state.lock();
                    // Saturating: reset() may have zeroed the counter while
                    // this load was in flight.
                    state.active_loads = state.active_loads.saturating_sub(1);
                }
                this.drain();
            });
        }

        state.draining = false;
    }

    /// Clears the pending queue and zeroes the slot counter.
    ///
    /// Loads already in flight are not awaited; their completions decrement
    /// saturating and may still populate the cache.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let dropped = state.pending.len();
        state.pending.clear();
        state.active_loads = 0;
        if dropped > 0 {
            debug!(dropped, "Prefetch queue cleared");
        }
    }

    /// Number of loads currently holding a slot.
    #[must_use]
    pub fn active_loads(&self) -> usize {
        self.state.lock().active_loads
    }

    /// Number of URLs waiting for a slot.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }
}
