//! Port definition for single-image loading.

use std::sync::Arc;

use async_trait::async_trait;

/// Handle to an image that finished loading and decoding.
pub type LoadedImage = Arc<image::DynamicImage>;

/// Port for downloading and decoding one image.
///
/// Prefetch is advisory: callers treat failures as non-events, so the
/// error type only needs to describe the failure well enough to log.
#[async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Downloads and decodes the image at `url`.
    ///
    /// # Errors
    /// Returns a human-readable reason on transport or decode failure.
    async fn fetch_image(&self, url: &str) -> Result<LoadedImage, String>;
}
