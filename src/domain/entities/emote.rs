//! Display-ready emote entity.

use serde::{Deserialize, Serialize};

/// A single emote ready for display.
///
/// Produced by the normalization pipeline from raw provider records. The
/// caller owns the active pool these live in; replacing or clearing the
/// pool is how they go away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emote {
    /// Name the player has to guess.
    pub name: String,
    /// URL of the image variant chosen for display.
    pub image: String,
}

impl Emote {
    /// Creates a new emote.
    #[must_use]
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
        }
    }
}
