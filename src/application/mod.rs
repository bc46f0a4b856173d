//! Application layer with the emote service facade.

/// Service implementations.
pub mod services;

pub use services::{EmoteService, ServiceConfig};
