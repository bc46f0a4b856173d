//! Domain layer with core entities, errors, and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Pure domain services.
pub mod services;

pub use entities::{Emote, EmoteUrlVariant, RawEmoteRecord};
pub use errors::EmoteError;
pub use ports::{EmoteSourcePort, ImageFetchPort, LoadedImage};
