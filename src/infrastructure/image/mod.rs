//! Image prefetch infrastructure.

mod prefetcher;

pub use prefetcher::{ImagePrefetcher, DEFAULT_MAX_CONCURRENT_LOADS};
