//! HTTP image fetcher backing the prefetcher.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::domain::ports::{ImageFetchPort, LoadedImage};

/// Downloads emote images and decodes them off the async path.
pub struct HttpImageClient {
    client: reqwest::Client,
}

impl HttpImageClient {
    /// Creates a fetcher reusing an existing HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn download(&self, url: &str) -> Result<Bytes, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        response
            .bytes()
            .await
            .map_err(|e| format!("failed to read body: {e}"))
    }
}

#[async_trait]
impl ImageFetchPort for HttpImageClient {
    async fn fetch_image(&self, url: &str) -> Result<LoadedImage, String> {
        let bytes = self.download(url).await?;

        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| format!("decode task panicked: {e}"))?
            .map_err(|e| format!("decode failed: {e}"))?;

        debug!(url, "Image loaded");
        Ok(Arc::new(decoded))
    }
}
