//! Domain error types.

mod emote_error;

pub use emote_error::EmoteError;
