//! Fingerprint-keyed memoization table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Unbounded fingerprint -> value memoization table.
///
/// Entries live until [`MemoTable::clear`] or a targeted
/// [`MemoTable::invalidate`]; there is no TTL or size bound. Callers that
/// race the first computation of a key may both compute; the compute
/// functions used here are pure and cheap, so no per-key lock is taken.
pub struct MemoTable<V> {
    entries: Mutex<HashMap<String, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> MemoTable<V> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Stores a value under a fingerprint, replacing any previous entry.
    pub fn insert(&self, key: &str, value: V) {
        self.entries.lock().insert(key.to_owned(), value);
    }

    /// Whether a fingerprint has an entry. Does not touch hit/miss counters.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Removes a single entry.
    pub fn invalidate(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    /// Empties the table. Hit/miss counters are left running.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns table statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.len(),
        }
    }
}

impl<V: Clone> MemoTable<V> {
    /// Looks up a fingerprint, cloning the value out.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.lock();
        match entries.get(key) {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Returns the cached value or computes, stores, and returns it.
    ///
    /// The lock is not held while `compute` runs.
    pub fn get_or_insert_with(&self, key: &str, compute: impl FnOnce() -> V) -> V {
        if let Some(hit) = self.get(key) {
            return hit;
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }
}

impl<V> Default for MemoTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about one memoization table.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of lookups that found an entry.
    pub hits: u64,
    /// Number of lookups that found nothing.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of entries.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} entries, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}
