//! URL validation and normalization for bookmark storage.
//!
//! Validation is strict and reports a specific [`ValidationError`];
//! normalization is best-effort and never fails.

use tracing::debug;
use url::Url;

use crate::types::errors::ValidationError;

/// Longest raw URL accepted, in characters.
pub const MAX_URL_LENGTH: usize = 2048;

/// Validates a candidate bookmark URL.
///
/// Checks run in order: emptiness, length, absolute-URL syntax, scheme, host.
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    if url.trim().is_empty() {
        return Err(ValidationError::EmptyUrl);
    }

    let len = url.chars().count();
    if len > MAX_URL_LENGTH {
        return Err(ValidationError::TooLong { len });
    }

    let parsed = Url::parse(url).map_err(|e| {
        debug!(error = %e, "URL failed to parse");
        ValidationError::MalformedUrl(e.to_string())
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedScheme(parsed.scheme().to_string()));
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(ValidationError::MissingHost),
    }
}

/// Returns the canonical form of `url`: lowercased host and at most one
/// redundant trailing slash removed from the path.
///
/// Input that does not parse is returned unchanged.
pub fn normalize_url(url: &str) -> String {
    let mut parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return url.to_string(),
    };

    if let Some(host) = parsed.host_str() {
        let lowered = host.to_lowercase();
        if lowered != host {
            // Special schemes already lowercase during parsing.
            let _ = parsed.set_host(Some(&lowered));
        }
    }

    let path = parsed.path();
    if path != "/" && path.len() > 1 && path.ends_with('/') {
        let trimmed = path[..path.len() - 1].to_string();
        parsed.set_path(&trimmed);
    }

    parsed.to_string()
}

/// Trims surrounding whitespace, then normalizes.
pub fn sanitize_url(url: &str) -> String {
    normalize_url(url.trim())
}
