use thiserror::Error;

// === ValidationError ===

/// Reasons a candidate bookmark URL is rejected before it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The URL is empty or whitespace only.
    #[error("URL cannot be empty")]
    EmptyUrl,
    /// The raw URL is longer than the accepted maximum.
    #[error("URL is too long ({len} characters, max 2048)")]
    TooLong { len: usize },
    /// The URL could not be parsed as an absolute URL.
    #[error("Invalid URL format: {0}")]
    MalformedUrl(String),
    /// The URL scheme is not http or https.
    #[error("Unsupported URL scheme '{0}': only HTTP and HTTPS are supported")]
    UnsupportedScheme(String),
    /// The URL parsed but carries no host.
    #[error("URL must have a valid hostname")]
    MissingHost,
}

impl ValidationError {
    /// Stable machine-readable code for this validation failure.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyUrl => "empty_url",
            ValidationError::TooLong { .. } => "url_too_long",
            ValidationError::MalformedUrl(_) => "malformed_url",
            ValidationError::UnsupportedScheme(_) => "unsupported_scheme",
            ValidationError::MissingHost => "missing_host",
        }
    }
}

// === BookmarkError ===

/// Errors related to bookmark and category store operations.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// No URL was supplied for a bookmark.
    #[error("URL is required")]
    MissingUrl,
    /// The supplied URL failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A bookmark with the same normalized URL already exists.
    #[error("URL already bookmarked: {0}")]
    DuplicateUrl(String),
    /// A category name was empty after trimming.
    #[error("Category name is required")]
    EmptyName,
    /// The targeted bookmark or category does not exist.
    #[error("Not found: {0}")]
    NotFound(i64),
    /// The referenced category does not exist.
    #[error("Category not found: {0}")]
    CategoryNotFound(i64),
    /// Unclassified storage failure. Carries the SQLite diagnostic.
    #[error("Bookmark database error: {0}")]
    Storage(String),
}

impl BookmarkError {
    /// HTTP-style status a caller should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            BookmarkError::MissingUrl
            | BookmarkError::Validation(_)
            | BookmarkError::EmptyName => 400,
            BookmarkError::NotFound(_) | BookmarkError::CategoryNotFound(_) => 404,
            BookmarkError::DuplicateUrl(_) => 409,
            BookmarkError::Storage(_) => 500,
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            BookmarkError::MissingUrl => "missing_url",
            BookmarkError::Validation(e) => e.code(),
            BookmarkError::DuplicateUrl(_) => "duplicate_url",
            BookmarkError::EmptyName => "empty_name",
            BookmarkError::NotFound(_) => "not_found",
            BookmarkError::CategoryNotFound(_) => "category_not_found",
            BookmarkError::Storage(_) => "storage_failure",
        }
    }

    /// Message safe to show an end user. Storage diagnostics stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            BookmarkError::Storage(_) => "Bookmark storage failed".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<rusqlite::Error> for BookmarkError {
    fn from(err: rusqlite::Error) -> Self {
        BookmarkError::Storage(err.to_string())
    }
}

// === RateLimitError ===

/// Errors raised while constructing a rate limiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitError {
    /// `max_requests` or `window_ms` was zero.
    #[error("Invalid rate limit configuration: {0}")]
    InvalidConfig(String),
}

// === FeedError ===

/// Errors from the upstream threat feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// No upstream API key is configured.
    #[error("Missing URLHAUS_AUTH_KEY")]
    MissingAuthKey,
    /// The upstream answered with a non-success status.
    #[error("Upstream failed with status {status}")]
    Upstream { status: u16 },
    /// The request could not be sent or completed.
    #[error("Feed request failed: {0}")]
    Request(String),
    /// The upstream body was not valid JSON.
    #[error("Feed response could not be decoded: {0}")]
    Decode(String),
}

impl FeedError {
    /// HTTP-style status a caller should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            FeedError::MissingAuthKey => 500,
            FeedError::Upstream { status } => *status,
            FeedError::Request(_) | FeedError::Decode(_) => 502,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FeedError::MissingAuthKey => "missing_auth_key",
            FeedError::Upstream { .. } => "upstream_failed",
            FeedError::Request(_) => "upstream_unreachable",
            FeedError::Decode(_) => "upstream_decode",
        }
    }
}

// === ConfigError ===

/// Errors related to loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Config I/O error: {0}")]
    Io(String),
    /// The config file is not valid JSON for `Config`.
    #[error("Config parse error: {0}")]
    Parse(String),
    /// A value is out of range.
    #[error("Invalid config value: {0}")]
    Invalid(String),
}
