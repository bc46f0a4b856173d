pub mod emote_service;

pub use emote_service::{EmoteService, ServiceConfig};
