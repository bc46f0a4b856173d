//! Infrastructure layer with external service adapters.

/// Result caching tables.
pub mod cache;
/// HTTP clients for the emote endpoint and image CDN.
pub mod http;
/// Image prefetch queue.
pub mod image;

pub use cache::{length_fingerprint, CacheStats, MemoTable, ResultCacheStats, ResultCaches};
pub use http::{EmoteApiClient, HttpImageClient};
pub use image::{ImagePrefetcher, DEFAULT_MAX_CONCURRENT_LOADS};
