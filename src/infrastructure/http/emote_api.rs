//! HTTP client for the channel emote endpoint.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::entities::RawEmoteRecord;
use crate::domain::errors::EmoteError;
use crate::domain::ports::EmoteSourcePort;

const EMOTE_API_BASE: &str = "https://emotes.crippled.dev/v1";
const RATELIMIT_RESET_HEADER: &str = "X-Ratelimit-Reset";

/// Client for the third-party channel emote API.
///
/// Performs one GET per fetch and maps transport, status, and body-shape
/// failures to [`EmoteError`]. Timeouts and cancellation are owned by the
/// caller, which drops the in-flight future at its own deadline.
pub struct EmoteApiClient {
    client: Client,
    base_url: String,
}

impl EmoteApiClient {
    /// Creates a client against the production endpoint.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, EmoteError> {
        Self::with_base_url(EMOTE_API_BASE)
    }

    /// Creates a client against a custom base URL.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, EmoteError> {
        let client = Client::builder()
            .build()
            .map_err(|e| EmoteError::request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl EmoteSourcePort for EmoteApiClient {
    async fn fetch_channel_emotes(
        &self,
        channel: &str,
    ) -> Result<Vec<RawEmoteRecord>, EmoteError> {
        let url = format!("{}/channel/{channel}/all", self.base_url);
        debug!(channel, "Fetching channel emotes");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, channel, "Emote endpoint unreachable");
                EmoteError::request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_status(status, response.headers()));
        }

        let body: Value = response.json().await.map_err(|e| {
            warn!(error = %e, channel, "Emote response body was not JSON");
            EmoteError::Format
        })?;

        let records = parse_record_list(body)?;
        debug!(channel, count = records.len(), "Fetched raw emote records");
        Ok(records)
    }
}

/// Maps a non-success status to an error, reading the rate-limit reset
/// window out of the response headers for 429.
fn error_from_status(status: StatusCode, headers: &header::HeaderMap) -> EmoteError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let reset_secs = headers
            .get(RATELIMIT_RESET_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("unknown")
            .to_owned();
        return EmoteError::RateLimited { reset_secs };
    }
    EmoteError::Network {
        status: status.as_u16(),
    }
}

/// Interprets the response body as a record list.
///
/// A non-array body is a format error; array entries that do not even
/// deserialize as objects are dropped without failing the response.
fn parse_record_list(body: Value) -> Result<Vec<RawEmoteRecord>, EmoteError> {
    let Value::Array(items) = body else {
        return Err(EmoteError::Format);
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}
