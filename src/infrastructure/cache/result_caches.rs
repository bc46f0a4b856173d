//! The five independent result caches.

use std::sync::Arc;

use crate::domain::entities::{Emote, RawEmoteRecord};
use crate::domain::ports::LoadedImage;

use super::memo_table::{CacheStats, MemoTable};

/// Fingerprint for pool-shaped cache keys.
///
/// Keys by length only, so two equal-sized collections collide and share
/// one entry. A known limitation carried over from the original design; a
/// content-derived fingerprint would fix it at the cost of hashing every
/// element on each lookup.
#[must_use]
pub fn length_fingerprint(len: usize) -> String {
    len.to_string()
}

/// The five independent memoization tables used by the emote core.
///
/// Each table is keyed by its own fingerprint and cleared only through
/// [`ResultCaches::clear_all`] or a targeted invalidation; insertion order
/// never matters.
pub struct ResultCaches {
    /// Pool length fingerprint -> ordered name list.
    pub names: MemoTable<Vec<String>>,
    /// Emote name -> rendered markup string.
    pub html: MemoTable<String>,
    /// Channel name -> validated raw record list.
    pub raw_fetch: MemoTable<Vec<RawEmoteRecord>>,
    /// Record list length fingerprint -> normalized emote pool.
    pub normalized: MemoTable<Vec<Emote>>,
    /// Image URL -> loaded image handle. Shared with the prefetcher.
    pub images: Arc<MemoTable<LoadedImage>>,
}

impl ResultCaches {
    /// Creates the empty cache set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: MemoTable::new(),
            html: MemoTable::new(),
            raw_fetch: MemoTable::new(),
            normalized: MemoTable::new(),
            images: Arc::new(MemoTable::new()),
        }
    }

    /// Empties all five tables.
    pub fn clear_all(&self) {
        self.names.clear();
        self.html.clear();
        self.raw_fetch.clear();
        self.normalized.clear();
        self.images.clear();
    }

    /// Returns per-table statistics.
    #[must_use]
    pub fn stats(&self) -> ResultCacheStats {
        ResultCacheStats {
            names: self.names.stats(),
            html: self.html.stats(),
            raw_fetch: self.raw_fetch.stats(),
            normalized: self.normalized.stats(),
            images: self.images.stats(),
        }
    }
}

impl Default for ResultCaches {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics for each of the five result caches.
#[derive(Debug, Clone)]
pub struct ResultCacheStats {
    /// Name list cache.
    pub names: CacheStats,
    /// Rendered markup cache.
    pub html: CacheStats,
    /// Raw fetch payload cache.
    pub raw_fetch: CacheStats,
    /// Normalized pool cache.
    pub normalized: CacheStats,
    /// Loaded image cache.
    pub images: CacheStats,
}
