//! Result caching infrastructure.

mod memo_table;
mod result_caches;

pub use memo_table::{CacheStats, MemoTable};
pub use result_caches::{length_fingerprint, ResultCacheStats, ResultCaches};
