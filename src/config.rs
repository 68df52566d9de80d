//! Configuration for Threatmark.
//!
//! Values come from three layers, later ones winning:
//! built-in defaults, an optional JSON file, and environment variables.
//!
//! - `THREATMARK_CONFIG`: path of the JSON file (default: `threatmark.json`)
//! - `THREATMARK_DB_PATH`: SQLite database path
//! - `URLHAUS_AUTH_KEY`: upstream API key
//! - `THREATMARK_RATE_LIMIT_MAX`: requests per window per client
//! - `THREATMARK_RATE_LIMIT_WINDOW_MS`: window length in milliseconds
//! - `THREATMARK_LOG`: tracing filter directive

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::errors::ConfigError;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "threatmark.json";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database path (default: threatmark.db)
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Tracing filter directive (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Feed endpoint rate limiting
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Upstream feed access
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Fixed-window rate limiter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests admitted per window per client (default: 10)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in milliseconds (default: 60000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Seconds between expired-window sweeps (default: 300)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// Upstream URLhaus client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// API root (default: https://urlhaus-api.abuse.ch/v1)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value of the `Auth-Key` header. Feed calls fail without it.
    #[serde(default)]
    pub auth_key: Option<String>,

    /// Listing size when the caller gives none (default: 100)
    #[serde(default = "default_feed_limit")]
    pub default_limit: u32,

    /// Largest listing size forwarded upstream (default: 1000)
    #[serde(default = "default_max_feed_limit")]
    pub max_limit: u32,

    /// Request timeout in seconds (default: 15)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How long a fetched listing is served from cache (default: 300)
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_db_path() -> String {
    "threatmark.db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_requests() -> u32 {
    10
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_base_url() -> String {
    "https://urlhaus-api.abuse.ch/v1".to_string()
}

fn default_feed_limit() -> u32 {
    100
}

fn default_max_feed_limit() -> u32 {
    1000
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            rate_limit: RateLimitConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_ms: default_window_ms(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_key: None,
            default_limit: default_feed_limit(),
            max_limit: default_max_feed_limit(),
            timeout_secs: default_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl FeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Config {
    /// Loads configuration the way the binary does: file named by
    /// `THREATMARK_CONFIG` (or the default file if present), then the process
    /// environment, then validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("THREATMARK_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file. A missing file yields the defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            ConfigError::Parse(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Applies environment overrides fetched through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("THREATMARK_DB_PATH") {
            self.db_path = path;
        }
        if let Some(key) = lookup("URLHAUS_AUTH_KEY").filter(|k| !k.trim().is_empty()) {
            self.feed.auth_key = Some(key);
        }
        if let Some(level) = lookup("THREATMARK_LOG") {
            self.log_level = level;
        }
        if let Some(raw) = lookup("THREATMARK_RATE_LIMIT_MAX") {
            self.rate_limit.max_requests = raw.parse().map_err(|_| {
                ConfigError::Invalid(format!("THREATMARK_RATE_LIMIT_MAX is not a number: {}", raw))
            })?;
        }
        if let Some(raw) = lookup("THREATMARK_RATE_LIMIT_WINDOW_MS") {
            self.rate_limit.window_ms = raw.parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "THREATMARK_RATE_LIMIT_WINDOW_MS is not a number: {}",
                    raw
                ))
            })?;
        }
        Ok(())
    }

    /// Rejects values the components cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.max_requests == 0 {
            return Err(ConfigError::Invalid("rate_limit.max_requests must be positive".to_string()));
        }
        if self.rate_limit.window_ms == 0 {
            return Err(ConfigError::Invalid("rate_limit.window_ms must be positive".to_string()));
        }
        if self.rate_limit.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.sweep_interval_secs must be positive".to_string(),
            ));
        }
        if self.feed.max_limit == 0 || self.feed.default_limit == 0 {
            return Err(ConfigError::Invalid("feed limits must be positive".to_string()));
        }
        if self.feed.default_limit > self.feed.max_limit {
            return Err(ConfigError::Invalid(
                "feed.default_limit cannot exceed feed.max_limit".to_string(),
            ));
        }
        url::Url::parse(&self.feed.base_url)
            .map_err(|e| ConfigError::Invalid(format!("feed.base_url: {}", e)))?;
        Ok(())
    }
}
