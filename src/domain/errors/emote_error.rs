//! Emote core error types.

use thiserror::Error;

/// Errors surfaced to the game collaborator.
///
/// All variants are terminal for the current call; the core never retries
/// internally. Per-record validation failures and image load failures are
/// recovered locally and never reach this type, except when validation
/// leaves zero usable records.
#[derive(Debug, Clone, Error)]
pub enum EmoteError {
    /// Endpoint answered with a non-success status.
    #[error("HTTP error! Status: {status}")]
    Network {
        /// Numeric HTTP status.
        status: u16,
    },

    /// Endpoint answered 429; carries the reset window it advertised.
    #[error("Rate limit exceeded. Reset in {reset_secs} seconds")]
    RateLimited {
        /// Value of the `X-Ratelimit-Reset` header, verbatim.
        reset_secs: String,
    },

    /// The fetch deadline elapsed.
    #[error("Request timed out")]
    Timeout,

    /// The request was superseded by a newer fetch for the same channel.
    #[error("request aborted")]
    Cancelled,

    /// Transport-level failure that never produced a status.
    #[error("network error: {message}")]
    Request {
        /// Human-readable transport failure detail.
        message: String,
    },

    /// Response body was not a JSON array of emote records.
    #[error("Invalid response format: expected an array of emotes")]
    Format,

    /// Every record in the response failed validation.
    #[error("No valid emotes found for channel: {channel}")]
    EmptyResult {
        /// Channel the fetch was issued for.
        channel: String,
    },

    /// Random selection was asked for on an empty pool.
    #[error("Cannot get random emote from empty array")]
    EmptyPool,
}

impl EmoteError {
    /// Creates a transport error.
    #[must_use]
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Whether the error came from the network boundary, as opposed to
    /// local validation or selection.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::RateLimited { .. }
                | Self::Timeout
                | Self::Cancelled
                | Self::Request { .. }
        )
    }
}
