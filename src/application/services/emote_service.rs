//! Emote service facade.
//!
//! Ties the remote fetch boundary, the result caches, the normalization
//! pipeline, and the image prefetcher together behind the plain-data API
//! the game collaborator consumes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::domain::entities::{Emote, RawEmoteRecord};
use crate::domain::errors::EmoteError;
use crate::domain::ports::{EmoteSourcePort, ImageFetchPort};
use crate::domain::services::selection;
use crate::infrastructure::cache::{length_fingerprint, ResultCacheStats, ResultCaches};
use crate::infrastructure::http::{EmoteApiClient, HttpImageClient};
use crate::infrastructure::image::{ImagePrefetcher, DEFAULT_MAX_CONCURRENT_LOADS};

/// Tunables for the emote service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Wall-clock deadline for one channel fetch.
    pub fetch_timeout: Duration,
    /// Bound on concurrent image prefetch loads.
    pub max_concurrent_loads: usize,
    /// Records normalized per scheduling tick.
    pub batch_size: usize,
    /// Number of leading emotes prefetched eagerly after normalization.
    pub eager_prefetch: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(15),
            max_concurrent_loads: DEFAULT_MAX_CONCURRENT_LOADS,
            batch_size: 500,
            eager_prefetch: 100,
        }
    }
}

/// A registered in-flight fetch.
///
/// The generation guard keeps a superseded call's cleanup from removing
/// its successor's token.
struct InFlight {
    generation: u64,
    token: CancellationToken,
}

/// Facade over emote acquisition, normalization, caching, and prefetch.
///
/// One instance serves one game session; all state is internal and plain
/// data flows out. Methods that fetch or prefetch must run inside a tokio
/// runtime.
pub struct EmoteService {
    source: Arc<dyn EmoteSourcePort>,
    caches: ResultCaches,
    prefetcher: Arc<ImagePrefetcher>,
    in_flight: Mutex<HashMap<String, InFlight>>,
    next_generation: AtomicU64,
    config: ServiceConfig,
}

impl EmoteService {
    /// Creates a service against the production emote endpoint.
    ///
    /// # Errors
    /// Returns an error if the HTTP clients cannot be created.
    pub fn new() -> Result<Self, EmoteError> {
        Self::with_config(ServiceConfig::default())
    }

    /// Creates a service against the production endpoint with custom tunables.
    ///
    /// # Errors
    /// Returns an error if the HTTP clients cannot be created.
    pub fn with_config(config: ServiceConfig) -> Result<Self, EmoteError> {
        let source = Arc::new(EmoteApiClient::new()?);
        let images = Arc::new(HttpImageClient::new(reqwest::Client::new()));
        Ok(Self::from_parts(source, images, config))
    }

    /// Wires a service from explicit boundary implementations.
    #[must_use]
    pub fn from_parts(
        source: Arc<dyn EmoteSourcePort>,
        images: Arc<dyn ImageFetchPort>,
        config: ServiceConfig,
    ) -> Self {
        let caches = ResultCaches::new();
        let prefetcher = Arc::new(ImagePrefetcher::new(
            images,
            Arc::clone(&caches.images),
            config.max_concurrent_loads,
        ));

        Self {
            source,
            caches,
            prefetcher,
            in_flight: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
            config,
        }
    }

    /// Fetches and validates the emote list for a channel.
    ///
    /// Returns the cached list when one exists. Otherwise cancels any
    /// in-flight fetch for the same channel, issues a fresh request under
    /// the configured deadline, drops records that fail shape validation,
    /// and caches the surviving list.
    ///
    /// # Errors
    /// Network, rate-limit, timeout, format, or empty-result errors; a
    /// superseded call reports [`EmoteError::Cancelled`]. Nothing is
    /// retried internally.
    pub async fn fetch_emotes(&self, channel: &str) -> Result<Vec<RawEmoteRecord>, EmoteError> {
        if let Some(cached) = self.caches.raw_fetch.get(channel) {
            debug!(channel, "Raw fetch cache hit");
            return Ok(cached);
        }

        let token = CancellationToken::new();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let superseded = {
            let mut in_flight = self.in_flight.lock();
            in_flight.insert(
                channel.to_owned(),
                InFlight {
                    generation,
                    token: token.clone(),
                },
            )
        };
        if let Some(previous) = superseded {
            debug!(channel, "Superseding in-flight fetch");
            previous.token.cancel();
        }

        let outcome = tokio::select! {
            () = token.cancelled() => Err(EmoteError::Cancelled),
            fetched = tokio::time::timeout(
                self.config.fetch_timeout,
                self.source.fetch_channel_emotes(channel),
            ) => match fetched {
                Ok(result) => result,
                Err(_elapsed) => Err(EmoteError::Timeout),
            },
        };

        // Cleanup runs on every path, guarded so a superseded call never
        // removes its successor's registration.
        {
            let mut in_flight = self.in_flight.lock();
            if in_flight
                .get(channel)
                .is_some_and(|entry| entry.generation == generation)
            {
                in_flight.remove(channel);
            }
        }

        let records = outcome?;
        let total = records.len();
        let valid: Vec<RawEmoteRecord> = records
            .into_iter()
            .filter(RawEmoteRecord::is_valid)
            .collect();

        if valid.is_empty() {
            warn!(channel, total, "No valid emotes survived validation");
            return Err(EmoteError::EmptyResult {
                channel: channel.to_owned(),
            });
        }

        debug!(
            channel,
            kept = valid.len(),
            dropped = total - valid.len(),
            "Channel emotes fetched"
        );
        self.caches.raw_fetch.insert(channel, valid.clone());
        Ok(valid)
    }

    /// Normalizes raw records into display-ready emotes.
    ///
    /// Output order equals input order. Records are handled in fixed-size
    /// batches with a yield between them purely to bound synchronous work
    /// per scheduling tick. The first emotes (up to the configured eager
    /// count) are handed to the prefetcher; the rest load lazily when
    /// their markup is requested.
    pub async fn process_emotes(&self, records: &[RawEmoteRecord]) -> Vec<Emote> {
        let fingerprint = length_fingerprint(records.len());
        if let Some(cached) = self.caches.normalized.get(&fingerprint) {
            trace!(fingerprint = %fingerprint, "Normalized pool cache hit");
            return cached;
        }

        let mut pool = Vec::with_capacity(records.len());
        for (batch_index, batch) in records.chunks(self.config.batch_size).enumerate() {
            if batch_index > 0 {
                tokio::task::yield_now().await;
            }

            for record in batch {
                if !record.is_valid() {
                    continue;
                }
                let Some(url) = record.display_url() else {
                    continue;
                };

                if pool.len() < self.config.eager_prefetch {
                    self.prefetcher.preload(url);
                }
                pool.push(Emote::new(record.code.clone(), url));
            }
        }

        debug!(count = pool.len(), "Normalized emote pool");
        self.caches.normalized.insert(&fingerprint, pool.clone());
        pool
    }

    /// Returns the ordered name list for a pool, memoized by pool length.
    #[must_use]
    pub fn get_emote_names(&self, pool: &[Emote]) -> Vec<String> {
        let fingerprint = length_fingerprint(pool.len());
        self.caches.names.get_or_insert_with(&fingerprint, || {
            pool.iter().map(|emote| emote.name.clone()).collect()
        })
    }

    /// Returns the card markup for an emote, memoized by name.
    ///
    /// A cache miss also queues the emote's image for prefetch, which is
    /// how emotes past the eager window get their images loaded.
    #[must_use]
    pub fn get_emote_html(&self, emote: &Emote) -> String {
        if let Some(cached) = self.caches.html.get(&emote.name) {
            return cached;
        }

        self.prefetcher.preload(&emote.image);

        let html = format!(
            r#"<a class="card"><img class="card--image4" src={} alt="Emoto" /></a>"#,
            emote.image
        );
        self.caches.html.insert(&emote.name, html.clone());
        html
    }

    /// Picks a uniformly random emote from the pool.
    ///
    /// # Errors
    /// Returns [`EmoteError::EmptyPool`] when the pool has no elements.
    pub fn get_random_emote<'pool>(
        &self,
        pool: &'pool [Emote],
    ) -> Result<&'pool Emote, EmoteError> {
        selection::pick_random(pool)
    }

    /// Removes `current` from the pool and its name from the name list.
    ///
    /// Swap-with-last removal: O(1), order not preserved, no-op when
    /// absent. Invalidates the name-list entry for the pool's new length
    /// fingerprint; entries under other lengths stay, consistent with the
    /// size-based key design.
    pub fn remove_current_emote(
        &self,
        pool: &mut Vec<Emote>,
        current: &Emote,
        names: &mut Vec<String>,
    ) {
        selection::swap_remove_emote(pool, current);
        selection::swap_remove_name(names, &current.name);
        self.caches
            .names
            .invalidate(&length_fingerprint(pool.len()));
    }

    /// Empties all five caches, resets prefetch accounting, and cancels
    /// every in-flight fetch.
    ///
    /// Cancellation is fire-and-forget: this returns without waiting for
    /// the cancelled requests to observe it.
    pub fn clear_cache(&self) {
        self.caches.clear_all();
        self.prefetcher.reset();

        let cancelled: Vec<InFlight> = {
            let mut in_flight = self.in_flight.lock();
            in_flight.drain().map(|(_, entry)| entry).collect()
        };
        let count = cancelled.len();
        for entry in &cancelled {
            entry.token.cancel();
        }
        if count > 0 {
            info!(count, "Cancelled in-flight emote fetches");
        }
        info!("Emote caches cleared");
    }

    /// Returns per-table cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> ResultCacheStats {
        self.caches.stats()
    }

    /// Number of image loads currently holding a slot.
    #[must_use]
    pub fn active_image_loads(&self) -> usize {
        self.prefetcher.active_loads()
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::entities::EmoteUrlVariant;
    use crate::domain::ports::mocks::{MockEmoteSource, MockImageFetcher};
    use tokio_test::assert_ok;

    use super::*;

    fn record(code: &str, urls: &[&str]) -> RawEmoteRecord {
        RawEmoteRecord {
            provider: Some(1),
            code: code.to_owned(),
            urls: urls
                .iter()
                .map(|url| EmoteUrlVariant {
                    url: Some((*url).to_owned()),
                })
                .collect(),
        }
    }

    fn invalid_record() -> RawEmoteRecord {
        RawEmoteRecord {
            provider: Some(1),
            code: String::new(),
            urls: vec![],
        }
    }

    fn build(
        config: ServiceConfig,
    ) -> (Arc<EmoteService>, Arc<MockEmoteSource>, Arc<MockImageFetcher>) {
        let source = Arc::new(MockEmoteSource::new());
        let images = Arc::new(MockImageFetcher::new(Duration::from_millis(5)));
        let service = EmoteService::from_parts(
            Arc::clone(&source) as Arc<dyn EmoteSourcePort>,
            Arc::clone(&images) as Arc<dyn ImageFetchPort>,
            config,
        );
        (Arc::new(service), source, images)
    }

    async fn wait_for_images(service: &EmoteService, count: usize) {
        for _ in 0..200 {
            if service.caches.images.len() >= count && service.active_image_loads() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("image prefetch did not settle");
    }

    #[tokio::test]
    async fn fetch_validates_and_caches() {
        let (service, source, _images) = build(ServiceConfig::default());
        source.push(Ok(vec![record("x", &["u"]), invalid_record()]));

        let records = tokio_test::assert_ok!(service.fetch_emotes("chan").await);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "x");

        // Second call is a cache hit; the source is not consulted again.
        let again = tokio_test::assert_ok!(service.fetch_emotes("chan").await);
        assert_eq!(again.len(), 1);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn all_invalid_records_fail_with_empty_result() {
        let (service, source, _images) = build(ServiceConfig::default());
        source.push(Ok(vec![invalid_record(), invalid_record()]));

        let err = service.fetch_emotes("chan").await.unwrap_err();
        assert!(matches!(err, EmoteError::EmptyResult { ref channel } if channel == "chan"));
        assert!(service.caches.raw_fetch.is_empty());
    }

    #[tokio::test]
    async fn fetch_error_is_not_cached_and_registry_is_cleaned() {
        let (service, source, _images) = build(ServiceConfig::default());
        source.push(Err(EmoteError::Network { status: 500 }));

        let err = service.fetch_emotes("chan").await.unwrap_err();
        assert!(matches!(err, EmoteError::Network { status: 500 }));
        assert!(service.caches.raw_fetch.is_empty());
        assert!(service.in_flight.lock().is_empty());
    }

    #[tokio::test]
    async fn superseding_fetch_cancels_the_first() {
        let (service, source, _images) = build(ServiceConfig::default());
        source.push_delayed(Ok(vec![record("stale", &["u"])]), Duration::from_secs(30));
        source.push(Ok(vec![record("fresh", &["u"])]));

        let first = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.fetch_emotes("chan").await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second = service.fetch_emotes("chan").await.unwrap();
        assert_eq!(second[0].code, "fresh");

        let first = first.await.unwrap();
        assert!(matches!(first, Err(EmoteError::Cancelled)));

        // Exactly one cache entry, from the superseding call.
        let cached = service.caches.raw_fetch.get("chan").unwrap();
        assert_eq!(cached[0].code, "fresh");
        assert!(service.in_flight.lock().is_empty());
    }

    #[tokio::test]
    async fn slow_fetch_times_out() {
        let config = ServiceConfig {
            fetch_timeout: Duration::from_millis(50),
            ..ServiceConfig::default()
        };
        let (service, source, _images) = build(config);
        source.push_delayed(Ok(vec![record("x", &["u"])]), Duration::from_secs(30));

        let err = service.fetch_emotes("chan").await.unwrap_err();
        assert!(matches!(err, EmoteError::Timeout));
        assert!(service.in_flight.lock().is_empty());
    }

    #[tokio::test]
    async fn process_preserves_order_and_picks_third_tier() {
        let (service, _source, _images) = build(ServiceConfig::default());
        let records = vec![
            record("first", &["1x", "2x", "3x", "4x"]),
            record("second", &["only"]),
        ];

        let pool = service.process_emotes(&records).await;

        assert_eq!(pool.len(), 2);
        assert_eq!(pool[0], Emote::new("first", "3x"));
        assert_eq!(pool[1], Emote::new("second", "only"));
    }

    #[tokio::test]
    async fn process_prefetches_only_the_eager_window() {
        let config = ServiceConfig {
            eager_prefetch: 2,
            ..ServiceConfig::default()
        };
        let (service, _source, images) = build(config);
        let records: Vec<RawEmoteRecord> = (0..5)
            .map(|i| record(&format!("e{i}"), &[format!("u{i}").as_str()]))
            .collect();

        let pool = service.process_emotes(&records).await;
        assert_eq!(pool.len(), 5);

        wait_for_images(&service, 2).await;
        assert_eq!(images.call_count(), 2);
    }

    #[tokio::test]
    async fn equal_length_record_lists_collide_in_the_cache() {
        // Current behavior: the normalized-pool fingerprint is the record
        // list length, so a second list of the same size returns the first
        // list's cached pool.
        let (service, _source, _images) = build(ServiceConfig::default());

        let pool_a = service.process_emotes(&[record("a", &["u1"])]).await;
        let pool_b = service.process_emotes(&[record("b", &["u2"])]).await;

        assert_eq!(pool_a, pool_b);
        assert_eq!(pool_b[0].name, "a");
    }

    #[tokio::test]
    async fn equal_length_pools_collide_in_the_name_cache() {
        let (service, _source, _images) = build(ServiceConfig::default());
        let pool_a = vec![Emote::new("a", "u1"), Emote::new("b", "u2")];
        let pool_b = vec![Emote::new("x", "u3"), Emote::new("y", "u4")];

        let names_a = service.get_emote_names(&pool_a);
        let names_b = service.get_emote_names(&pool_b);

        assert_eq!(names_a, vec!["a", "b"]);
        assert_eq!(names_b, names_a);
    }

    #[tokio::test]
    async fn html_is_rendered_once_and_prefetches_the_image() {
        let (service, _source, images) = build(ServiceConfig::default());
        let emote = Emote::new("Kappa", "https://cdn.example/kappa/3x");

        let html = service.get_emote_html(&emote);
        assert_eq!(
            html,
            r#"<a class="card"><img class="card--image4" src=https://cdn.example/kappa/3x alt="Emoto" /></a>"#
        );

        assert_eq!(service.get_emote_html(&emote), html);
        assert_eq!(service.caches.html.len(), 1);

        wait_for_images(&service, 1).await;
        assert_eq!(images.call_count(), 1);
    }

    #[tokio::test]
    async fn remove_invalidates_only_the_new_fingerprint() {
        let (service, _source, _images) = build(ServiceConfig::default());
        let mut pool = vec![
            Emote::new("a", "u1"),
            Emote::new("b", "u2"),
            Emote::new("c", "u3"),
        ];
        let mut names = service.get_emote_names(&pool);
        let current = pool[1].clone();

        service.remove_current_emote(&mut pool, &current, &mut names);

        assert_eq!(pool.len(), 2);
        assert!(!pool.contains(&current));
        assert_eq!(names.len(), 2);
        assert!(!names.contains(&"b".to_owned()));

        // Only the new length's entry is invalidated; the old entry for
        // the three-element pool is left stale on purpose.
        assert!(service.caches.names.get("2").is_none());
        assert!(service.caches.names.get("3").is_some());
    }

    #[tokio::test]
    async fn remove_of_absent_emote_is_noop() {
        let (service, _source, _images) = build(ServiceConfig::default());
        let mut pool = vec![Emote::new("a", "u1"), Emote::new("b", "u2")];
        let mut names = vec!["a".to_owned(), "b".to_owned()];
        let absent = Emote::new("zz", "u9");

        service.remove_current_emote(&mut pool, &absent, &mut names);

        assert_eq!(pool.len(), 2);
        assert_eq!(names.len(), 2);
    }

    #[tokio::test]
    async fn random_selection_on_empty_pool_fails() {
        let (service, _source, _images) = build(ServiceConfig::default());
        let err = service.get_random_emote(&[]).unwrap_err();
        assert!(matches!(err, EmoteError::EmptyPool));
    }

    #[tokio::test]
    async fn clear_cache_empties_tables_and_cancels_fetches() {
        let (service, source, _images) = build(ServiceConfig::default());
        source.push(Ok(vec![record("x", &["u"])]));
        let records = tokio_test::assert_ok!(service.fetch_emotes("warm").await);
        let pool = service.process_emotes(&records).await;
        let _ = service.get_emote_names(&pool);

        source.push_delayed(Ok(vec![record("slow", &["u"])]), Duration::from_secs(30));
        let hanging = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.fetch_emotes("other").await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        service.clear_cache();

        assert!(service.caches.raw_fetch.is_empty());
        assert!(service.caches.normalized.is_empty());
        assert!(service.caches.names.is_empty());
        assert!(service.in_flight.lock().is_empty());

        let hanging = hanging.await.unwrap();
        assert!(matches!(hanging, Err(EmoteError::Cancelled)));
    }
}
