//! Raw provider record shape.

use serde::Deserialize;

/// One image variant offered by the provider, usually a resolution tier.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmoteUrlVariant {
    /// Variant URL. Providers occasionally omit it on individual tiers.
    #[serde(default)]
    pub url: Option<String>,
}

/// Raw emote record as returned by the channel emote endpoint.
///
/// Deserialization is lenient on purpose: missing fields default and
/// unknown fields are ignored, so shape problems surface through
/// [`RawEmoteRecord::is_valid`] instead of failing the whole response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEmoteRecord {
    /// Numeric provider tag (Twitch, BTTV, FFZ, 7TV...).
    #[serde(default)]
    pub provider: Option<i64>,
    /// Emote code, which doubles as its display name.
    #[serde(default)]
    pub code: String,
    /// Available image variants, ordered by resolution tier.
    #[serde(default)]
    pub urls: Vec<EmoteUrlVariant>,
}

impl RawEmoteRecord {
    /// Whether the record carries enough data to normalize: a provider
    /// tag, a non-empty code, and at least one variant with a URL.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.provider.is_some()
            && !self.code.is_empty()
            && !self.urls.is_empty()
            && self.urls.iter().any(|variant| variant.url.is_some())
    }

    /// Picks the display URL: the third variant when available (a higher
    /// resolution tier), otherwise the last one. When the chosen slot
    /// carries no URL, falls back to the first variant that does.
    #[must_use]
    pub fn display_url(&self) -> Option<&str> {
        if self.urls.is_empty() {
            return None;
        }
        let tier = usize::min(2, self.urls.len() - 1);
        self.urls[tier]
            .url
            .as_deref()
            .or_else(|| self.urls.iter().find_map(|variant| variant.url.as_deref()))
    }
}
