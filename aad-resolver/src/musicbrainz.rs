//! MusicBrainz web service client
//!
//! Implements [`Fetcher`] for artist and area lookups and provides the
//! release lookup used by the command-line tool. Documents are returned as
//! raw JSON; interpretation happens in [`crate::parse`].
//!
//! Requests are spaced by a rate limiter (one per second by default) since
//! the engine issues every lookup of a release at once. Engine lookups wait
//! on it through [`Fetcher::ready`], before their timeout starts.

use crate::fetcher::{FetchError, FetchRequest, Fetcher};
use crate::model::EntityKind;
use aad_common::MusicBrainzConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Transport-level timeout; the engine applies its own per-fetch timeout
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Enforces a minimum interval between requests
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    /// Wait if necessary to comply with rate limit
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
}

impl MusicBrainzClient {
    pub fn new(config: &MusicBrainzConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limit_ms)),
        })
    }

    /// Lookup URL for an artist or area
    ///
    /// Area lookups include area relations, which carry the `part of` links.
    pub fn entity_url(&self, kind: EntityKind, id: &str) -> String {
        match kind {
            EntityKind::Artist => format!("{}/artist/{}?fmt=json", self.base_url, id),
            EntityKind::Area => format!("{}/area/{}?inc=area-rels&fmt=json", self.base_url, id),
        }
    }

    pub fn release_url(&self, mbid: &str) -> String {
        format!(
            "{}/release/{}?inc=artist-credits+recordings&fmt=json",
            self.base_url, mbid
        )
    }

    /// Lookup release with artist credits and track listing
    pub async fn lookup_release(&self, mbid: &str) -> Result<Value, FetchError> {
        self.rate_limiter.wait().await;
        self.get_json(&self.release_url(mbid), mbid).await
    }

    async fn get_json(&self, url: &str, id: &str) -> Result<Value, FetchError> {
        debug!(id = %id, url = %url, "Querying MusicBrainz API");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();

        if status == 404 {
            return Err(FetchError::NotFound(id.to_string()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(FetchError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))
    }
}

#[async_trait]
impl Fetcher for MusicBrainzClient {
    async fn ready(&self) {
        self.rate_limiter.wait().await;
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Value, FetchError> {
        let url = self.entity_url(request.kind, &request.id);
        self.get_json(&url, &request.id).await
    }
}
