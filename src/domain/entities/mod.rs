//! Domain entity definitions.

mod emote;
mod raw_record;

pub use emote::Emote;
pub use raw_record::{EmoteUrlVariant, RawEmoteRecord};
