//! HTTP adapters for the emote endpoint and image CDN.

mod emote_api;
mod image_client;

pub use emote_api::EmoteApiClient;
pub use image_client::HttpImageClient;
