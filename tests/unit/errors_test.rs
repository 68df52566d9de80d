use threatmark::types::errors::*;

// === ValidationError Tests ===

#[test]
fn validation_error_display_variants() {
    assert_eq!(ValidationError::EmptyUrl.to_string(), "URL cannot be empty");
    assert_eq!(
        ValidationError::TooLong { len: 2049 }.to_string(),
        "URL is too long (2049 characters, max 2048)"
    );
    assert_eq!(
        ValidationError::UnsupportedScheme("ftp".to_string()).to_string(),
        "Unsupported URL scheme 'ftp': only HTTP and HTTPS are supported"
    );
    assert_eq!(
        ValidationError::MissingHost.to_string(),
        "URL must have a valid hostname"
    );
}

// === BookmarkError Tests ===

#[test]
fn bookmark_error_display_variants() {
    assert_eq!(BookmarkError::MissingUrl.to_string(), "URL is required");
    assert_eq!(
        BookmarkError::DuplicateUrl("http://example.com/".to_string()).to_string(),
        "URL already bookmarked: http://example.com/"
    );
    assert_eq!(BookmarkError::EmptyName.to_string(), "Category name is required");
    assert_eq!(BookmarkError::NotFound(7).to_string(), "Not found: 7");
    assert_eq!(
        BookmarkError::CategoryNotFound(3).to_string(),
        "Category not found: 3"
    );
    assert_eq!(
        BookmarkError::Storage("disk I/O error".to_string()).to_string(),
        "Bookmark database error: disk I/O error"
    );
}

#[test]
fn bookmark_error_validation_is_transparent() {
    let err = BookmarkError::from(ValidationError::EmptyUrl);
    assert_eq!(err.to_string(), "URL cannot be empty");
    assert_eq!(err.code(), "empty_url");
}

#[test]
fn bookmark_error_status_codes() {
    assert_eq!(BookmarkError::MissingUrl.status_code(), 400);
    assert_eq!(BookmarkError::Validation(ValidationError::MissingHost).status_code(), 400);
    assert_eq!(BookmarkError::EmptyName.status_code(), 400);
    assert_eq!(BookmarkError::NotFound(1).status_code(), 404);
    assert_eq!(BookmarkError::CategoryNotFound(1).status_code(), 404);
    assert_eq!(BookmarkError::DuplicateUrl(String::new()).status_code(), 409);
    assert_eq!(BookmarkError::Storage(String::new()).status_code(), 500);
}

#[test]
fn storage_error_public_message_hides_detail() {
    let err = BookmarkError::Storage("no such table: bookmarks".to_string());
    assert_eq!(err.public_message(), "Bookmark storage failed");
    assert!(err.to_string().contains("no such table"));
}

#[test]
fn bookmark_error_from_rusqlite_is_storage() {
    let err: BookmarkError = rusqlite::Error::QueryReturnedNoRows.into();
    assert!(matches!(err, BookmarkError::Storage(_)));
}

#[test]
fn bookmark_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(BookmarkError::NotFound(1));
    assert!(err.source().is_none());
}

// === FeedError Tests ===

#[test]
fn feed_error_status_codes() {
    assert_eq!(FeedError::MissingAuthKey.status_code(), 500);
    assert_eq!(FeedError::Upstream { status: 503 }.status_code(), 503);
    assert_eq!(FeedError::Request("timeout".into()).status_code(), 502);
    assert_eq!(FeedError::Decode("eof".into()).status_code(), 502);
    assert_eq!(FeedError::MissingAuthKey.to_string(), "Missing URLHAUS_AUTH_KEY");
}

// === RateLimitError / ConfigError Tests ===

#[test]
fn rate_limit_and_config_error_display() {
    assert_eq!(
        RateLimitError::InvalidConfig("window_ms must be positive".into()).to_string(),
        "Invalid rate limit configuration: window_ms must be positive"
    );
    assert_eq!(
        ConfigError::Invalid("bad".into()).to_string(),
        "Invalid config value: bad"
    );
}
