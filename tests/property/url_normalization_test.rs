//! Property-based tests for URL validation and normalization.
//!
//! These tests verify that normalization is stable, that host case never
//! distinguishes two URLs, and that validation accepts exactly the
//! well-formed http(s) inputs generated here.

use proptest::prelude::*;
use threatmark::services::url_validator::{normalize_url, sanitize_url, validate_url};
use threatmark::types::errors::ValidationError;

/// Host made of mixed-case labels with a fixed TLD.
fn arb_host() -> impl Strategy<Value = String> {
    (
        "[a-zA-Z][a-zA-Z0-9]{0,12}",
        proptest::option::of("[a-zA-Z][a-zA-Z0-9]{0,8}"),
        prop_oneof![Just(".com"), Just(".NET"), Just(".io"), Just(".Org")],
    )
        .prop_map(|(label, sub, tld)| match sub {
            Some(sub) => format!("{}.{}{}", sub, label, tld),
            None => format!("{}{}", label, tld),
        })
}

/// Path with at most one trailing slash.
///
/// Paths ending in `//` are left out on purpose: normalization strips a single
/// trailing slash per pass, so `/a//` becomes `/a/` and then `/a`. Idempotence
/// holds only for paths ending in at most one slash; the `//` case is pinned by
/// `test_double_trailing_slash_needs_two_passes` in the validator unit tests.
fn arb_path() -> impl Strategy<Value = String> {
    (
        proptest::collection::vec("[a-zA-Z0-9_.-]{1,8}", 0..4),
        any::<bool>(),
    )
        .prop_map(|(segments, trailing)| {
            let mut path = String::new();
            for seg in segments {
                path.push('/');
                path.push_str(&seg);
            }
            if trailing || path.is_empty() {
                path.push('/');
            }
            path
        })
}

fn arb_url() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("http"), Just("https"), Just("HTTP")],
        arb_host(),
        arb_path(),
        proptest::option::of("[a-z]{1,5}=[a-z0-9]{1,5}"),
    )
        .prop_map(|(scheme, host, path, query)| match query {
            Some(q) => format!("{}://{}{}?{}", scheme, host, path, q),
            None => format!("{}://{}{}", scheme, host, path),
        })
}

// **Property 1: Normalization is idempotent**
//
// *For any* URL whose path ends in at most one slash, normalizing twice
// SHALL give the same result as normalizing once. URLs ending in `//` are
// excluded: they need two passes to settle (see `arb_path`).
proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn normalize_is_idempotent(url in arb_url()) {
        let once = normalize_url(&url);
        prop_assert_eq!(normalize_url(&once), once);
    }

    #[test]
    fn generated_urls_validate(url in arb_url()) {
        prop_assert_eq!(validate_url(&url), Ok(()));
        prop_assert_eq!(validate_url(&normalize_url(&url)), Ok(()));
    }
}

// **Property 2: Host case is insignificant**
//
// *For any* URL, upper- and lower-casing only the host SHALL normalize to
// the same string.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn host_case_does_not_change_normalized_form(host in arb_host(), path in arb_path()) {
        let upper = format!("https://{}{}", host.to_uppercase(), path);
        let lower = format!("https://{}{}", host.to_lowercase(), path);
        prop_assert_eq!(normalize_url(&upper), normalize_url(&lower));
    }

    #[test]
    fn sanitize_ignores_surrounding_whitespace(
        url in arb_url(),
        lead in "[ \t]{0,3}",
        trail in "[ \t\n]{0,3}",
    ) {
        let padded = format!("{}{}{}", lead, url, trail);
        prop_assert_eq!(sanitize_url(&padded), normalize_url(&url));
    }
}

// **Property 3: Relative or scheme-less input is malformed**
//
// *For any* string without a ':' that is not blank, validation SHALL report
// a malformed URL, and normalization SHALL return it unchanged.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn scheme_less_input_is_malformed(raw in "[a-zA-Z0-9./_-]{1,40}") {
        prop_assert!(matches!(validate_url(&raw), Err(ValidationError::MalformedUrl(_))));
        prop_assert_eq!(normalize_url(&raw), raw);
    }
}
