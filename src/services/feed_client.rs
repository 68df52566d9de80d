//! URLhaus feed client.
//!
//! Fetches the "recent URLs" and "recent payloads" listings and keeps each
//! response for `cache_ttl_secs` so repeated page loads do not hit upstream.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::FeedConfig;
use crate::types::errors::FeedError;
use crate::types::feed::FeedKind;

struct CachedListing {
    fetched_at: Instant,
    body: Value,
}

/// HTTP client for the upstream threat feed.
pub struct FeedClient {
    http: reqwest::Client,
    config: FeedConfig,
    cache: Mutex<HashMap<(FeedKind, u32), CachedListing>>,
}

impl FeedClient {
    /// Creates a client. Fails only if the TLS backend cannot be initialized.
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| FeedError::Request(e.to_string()))?;

        Ok(Self {
            http,
            config,
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Clamps a caller-supplied listing size into `1..=max_limit`.
    ///
    /// `None` selects the configured default.
    pub fn clamp_limit(&self, requested: Option<i64>) -> u32 {
        let max = i64::from(self.config.max_limit);
        match requested {
            Some(n) => n.clamp(1, max) as u32,
            None => self.config.default_limit.min(self.config.max_limit),
        }
    }

    /// Full upstream URL for a listing.
    pub fn endpoint(&self, kind: FeedKind, limit: u32) -> String {
        format!(
            "{}/{}/recent/limit/{}/",
            self.config.base_url.trim_end_matches('/'),
            kind.path(),
            limit
        )
    }

    /// Returns the listing, from cache when still fresh.
    pub async fn fetch(&self, kind: FeedKind, limit: u32) -> Result<Value, FeedError> {
        let auth_key = self
            .config
            .auth_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(FeedError::MissingAuthKey)?;

        if let Some(body) = self.cached(kind, limit, Instant::now()) {
            debug!(?kind, limit, "Feed cache hit");
            return Ok(body);
        }

        let url = self.endpoint(kind, limit);
        debug!(%url, "Fetching feed listing");

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(auth_key)
            .map_err(|e| FeedError::Request(format!("invalid Auth-Key header: {}", e)))?;
        headers.insert("auth-key", key);

        let response = self
            .http
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Feed request failed");
                FeedError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Upstream feed returned an error");
            return Err(FeedError::Upstream {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FeedError::Decode(e.to_string()))?;

        self.store(kind, limit, body.clone(), Instant::now());
        Ok(body)
    }

    /// Cached body for `(kind, limit)` if it is younger than the TTL at `now`.
    pub fn cached(&self, kind: FeedKind, limit: u32, now: Instant) -> Option<Value> {
        let ttl = self.config.cache_ttl();
        let cache = self.lock_cache();
        cache
            .get(&(kind, limit))
            .filter(|entry| now.saturating_duration_since(entry.fetched_at) < ttl)
            .map(|entry| entry.body.clone())
    }

    /// Records a fetched body as of `fetched_at`, dropping stale listings.
    pub fn store(&self, kind: FeedKind, limit: u32, body: Value, fetched_at: Instant) {
        let ttl = self.config.cache_ttl();
        if ttl == Duration::ZERO {
            return;
        }
        let mut cache = self.lock_cache();
        cache.retain(|_, entry| fetched_at.saturating_duration_since(entry.fetched_at) < ttl);
        cache.insert((kind, limit), CachedListing { fetched_at, body });
    }

    // Entries are inserted whole, so a poisoned cache is still consistent.
    fn lock_cache(&self) -> MutexGuard<'_, HashMap<(FeedKind, u32), CachedListing>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
