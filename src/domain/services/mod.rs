//! Pure domain services.

/// Selection helpers over the caller-owned emote pool.
pub mod selection;
