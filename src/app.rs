//! App Core for Threatmark.
//!
//! Central struct holding the bookmark database, the feed rate limiters and
//! the feed client, managing their lifecycle.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::Config;
use crate::database::connection::Database;
use crate::services::feed_client::FeedClient;
use crate::services::rate_limiter::RateLimiter;
use crate::types::feed::FeedKind;

/// Central application struct.
///
/// `BookmarkManager` is created on demand from the locked connection because
/// it borrows `&Connection` with a lifetime.
pub struct App {
    pub config: Config,
    db: Mutex<Database>,
    pub urls_limiter: Arc<RateLimiter>,
    pub payloads_limiter: Arc<RateLimiter>,
    pub feed_client: FeedClient,
}

impl App {
    /// Creates a new App from configuration, opening the database at `config.db_path`.
    pub fn new(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open(&config.db_path)?;
        Self::with_database(config, db)
    }

    /// Creates an App over an in-memory database.
    pub fn open_in_memory(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open_in_memory()?;
        Self::with_database(config, db)
    }

    fn with_database(config: Config, db: Database) -> Result<Self, Box<dyn std::error::Error>> {
        config.validate()?;

        // One limiter per guarded endpoint.
        let urls_limiter = Arc::new(RateLimiter::new(&config.rate_limit)?);
        let payloads_limiter = Arc::new(RateLimiter::new(&config.rate_limit)?);
        let feed_client = FeedClient::new(config.feed.clone())?;

        info!(
            db_path = %config.db_path,
            max_requests = config.rate_limit.max_requests,
            window_ms = config.rate_limit.window_ms,
            "Threatmark initialized"
        );

        Ok(Self {
            config,
            db: Mutex::new(db),
            urls_limiter,
            payloads_limiter,
            feed_client,
        })
    }

    /// Locks the database for one store operation.
    ///
    /// A poisoned lock is recovered: statements and transactions left by the
    /// panicked call were finalized or rolled back on drop.
    pub fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(|poisoned| {
            warn!("Database lock was poisoned by a panicked call, recovering");
            poisoned.into_inner()
        })
    }

    /// Limiter guarding the given feed listing.
    pub fn limiter_for(&self, kind: FeedKind) -> &Arc<RateLimiter> {
        match kind {
            FeedKind::RecentUrls => &self.urls_limiter,
            FeedKind::RecentPayloads => &self.payloads_limiter,
        }
    }

    /// Starts the periodic expired-window sweep for every limiter.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_background_tasks(&self) -> Vec<JoinHandle<()>> {
        let interval = self.config.rate_limit.sweep_interval();
        vec![
            self.urls_limiter.spawn_sweeper(interval),
            self.payloads_limiter.spawn_sweeper(interval),
        ]
    }
}
