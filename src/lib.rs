//! Emoteset - emote acquisition and caching core.
//!
//! Fetches a channel's emote set from a third-party provider, normalizes
//! the raw records into a minimal display model, memoizes results across
//! several independent caches, and warms an image cache through a
//! bounded-concurrency prefetch queue. The game or UI sitting on top owns
//! all presentation state; this core only hands back plain data and
//! markup strings.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the service facade.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

pub use application::services::{EmoteService, ServiceConfig};
pub use domain::entities::{Emote, EmoteUrlVariant, RawEmoteRecord};
pub use domain::errors::EmoteError;
pub use domain::services::selection::filter_emotes;
pub use infrastructure::cache::{CacheStats, ResultCacheStats};

/// Current version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
