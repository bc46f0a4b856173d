//! Port definition for the remote emote provider.

use async_trait::async_trait;

use crate::domain::entities::RawEmoteRecord;
use crate::domain::errors::EmoteError;

/// Port for the channel emote endpoint.
///
/// Implementations perform one GET per call and map transport, status, and
/// body-shape failures to [`EmoteError`]. They do not cache, validate
/// record contents, or retry; that is the service's concern.
#[async_trait]
pub trait EmoteSourcePort: Send + Sync {
    /// Fetches the raw emote record list for a channel.
    ///
    /// # Errors
    /// Returns a network, rate-limit, or format error. Individual records
    /// that fail shape checks are dropped, not errored.
    async fn fetch_channel_emotes(
        &self,
        channel: &str,
    ) -> Result<Vec<RawEmoteRecord>, EmoteError>;
}
