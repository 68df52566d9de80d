//! Fixed-window rate limiter keyed by client identifier.
//!
//! Each identifier gets its own window of `window_ms` milliseconds admitting at
//! most `max_requests` calls. State lives only in process memory. Expired
//! windows are reset lazily on the next check and removed in bulk by
//! [`RateLimiter::sweep_expired`], which [`RateLimiter::spawn_sweeper`] runs on
//! a timer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::RateLimitConfig;
use crate::types::errors::RateLimitError;
use crate::types::rate_limit::RateLimitDecision;

/// Identifier shared by every client whose address cannot be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug)]
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// Thread-safe fixed-window limiter.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl RateLimiter {
    /// Creates a limiter, rejecting a zero request budget or zero window.
    pub fn new(config: &RateLimitConfig) -> Result<Self, RateLimitError> {
        if config.max_requests == 0 {
            return Err(RateLimitError::InvalidConfig(
                "max_requests must be positive".to_string(),
            ));
        }
        if config.window_ms == 0 {
            return Err(RateLimitError::InvalidConfig(
                "window_ms must be positive".to_string(),
            ));
        }

        Ok(Self {
            max_requests: config.max_requests,
            window: config.window(),
            entries: Mutex::new(HashMap::new()),
        })
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records a request from `identifier` at the current instant.
    pub fn check(&self, identifier: &str) -> RateLimitDecision {
        self.check_at(identifier, Instant::now())
    }

    /// Records a request from `identifier` as if made at `now`.
    pub fn check_at(&self, identifier: &str, now: Instant) -> RateLimitDecision {
        let mut entries = self.lock_entries();

        if let Some(entry) = entries.get_mut(identifier) {
            if entry.reset_at > now {
                if entry.count < self.max_requests {
                    entry.count += 1;
                    return RateLimitDecision {
                        allowed: true,
                        remaining: self.max_requests - entry.count,
                        reset_at: entry.reset_at,
                    };
                }

                debug!(client = identifier, "Rate limit exceeded");
                return RateLimitDecision {
                    allowed: false,
                    remaining: 0,
                    reset_at: entry.reset_at,
                };
            }
        }

        // First request, or the previous window has fully elapsed.
        let reset_at = now + self.window;
        entries.insert(identifier.to_string(), WindowEntry { count: 1, reset_at });
        RateLimitDecision {
            allowed: true,
            remaining: self.max_requests - 1,
            reset_at,
        }
    }

    /// Removes every entry whose window has elapsed. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    pub fn sweep_expired_at(&self, now: Instant) -> usize {
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|_, entry| entry.reset_at > now);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, tracked = entries.len(), "Swept expired rate limit windows");
        }
        removed
    }

    /// Number of identifiers currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.lock_entries().len()
    }

    /// Spawns a tokio task that sweeps expired entries every `interval`.
    ///
    /// Must be called from within a tokio runtime. The task stops when the
    /// returned handle is aborted.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                limiter.sweep_expired();
            }
        })
    }

    // A poisoned map only means another check panicked mid-update; the counts
    // themselves are still usable.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, WindowEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Derives the rate limit key for a request from its proxy headers.
///
/// Prefers the first `X-Forwarded-For` entry, then `X-Real-IP`, then
/// [`UNKNOWN_CLIENT`].
pub fn client_identifier(forwarded_for: Option<&str>, real_ip: Option<&str>) -> String {
    let forwarded = forwarded_for
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    match real_ip.map(str::trim).filter(|ip| !ip.is_empty()) {
        Some(ip) => ip.to_string(),
        None => UNKNOWN_CLIENT.to_string(),
    }
}
