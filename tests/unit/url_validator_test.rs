//! Unit tests for URL validation, normalization and sanitization.

use rstest::rstest;
use threatmark::services::url_validator::{normalize_url, sanitize_url, validate_url, MAX_URL_LENGTH};
use threatmark::types::errors::ValidationError;

#[rstest]
#[case("http://example.com")]
#[case("https://example.com/path/to/payload.exe")]
#[case("http://185.215.113.66/bins/x86")]
#[case("http://[::1]:8080/")]
#[case("https://sub.example.co.uk/a?b=c#d")]
fn test_valid_urls_pass(#[case] url: &str) {
    assert_eq!(validate_url(url), Ok(()));
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\t\n")]
fn test_blank_urls_are_empty(#[case] url: &str) {
    assert_eq!(validate_url(url), Err(ValidationError::EmptyUrl));
}

#[test]
fn test_length_limit_is_inclusive() {
    let prefix = "http://example.com/";
    let at_limit = format!("{}{}", prefix, "a".repeat(MAX_URL_LENGTH - prefix.len()));
    assert_eq!(at_limit.len(), 2048);
    assert_eq!(validate_url(&at_limit), Ok(()));

    let over = format!("{}a", at_limit);
    assert_eq!(validate_url(&over), Err(ValidationError::TooLong { len: 2049 }));
}

#[rstest]
#[case("example.com")]
#[case("/relative/path")]
#[case("http://")]
#[case("https://exa mple.com")]
#[case("not a url")]
fn test_unparseable_urls_are_malformed(#[case] url: &str) {
    assert!(matches!(validate_url(url), Err(ValidationError::MalformedUrl(_))));
}

#[rstest]
#[case("ftp://host/x", "ftp")]
#[case("javascript:alert(1)", "javascript")]
#[case("file:///etc/passwd", "file")]
#[case("mailto:abuse@example.com", "mailto")]
fn test_other_schemes_are_unsupported(#[case] url: &str, #[case] scheme: &str) {
    assert_eq!(
        validate_url(url),
        Err(ValidationError::UnsupportedScheme(scheme.to_string()))
    );
}

#[rstest]
#[case("http://Example.COM/a/", "http://example.com/a")]
#[case("https://example.com/", "https://example.com/")]
#[case("https://example.com", "https://example.com/")]
#[case("http://example.com/a/b/", "http://example.com/a/b")]
#[case("http://example.com/Path/", "http://example.com/Path")]
#[case("http://example.com/a?x=1", "http://example.com/a?x=1")]
fn test_normalize(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(normalize_url(input), expected);
}

#[test]
fn test_normalize_returns_unparseable_input_unchanged() {
    assert_eq!(normalize_url("not a url"), "not a url");
    assert_eq!(normalize_url(""), "");
}

#[test]
fn test_sanitize_trims_then_normalizes() {
    assert_eq!(sanitize_url("  http://EXAMPLE.com/x/  "), "http://example.com/x");
}

#[test]
fn test_double_trailing_slash_needs_two_passes() {
    let once = normalize_url("http://example.com/a//");
    assert_eq!(once, "http://example.com/a/");
    assert_eq!(normalize_url(&once), "http://example.com/a");
}
