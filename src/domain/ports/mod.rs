//! Port definitions for external boundaries.

mod emote_source_port;
mod image_fetch_port;

pub use emote_source_port::EmoteSourcePort;
pub use image_fetch_port::{ImageFetchPort, LoadedImage};
