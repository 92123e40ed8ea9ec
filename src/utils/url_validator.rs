//! Permissive URL shape validation.
//!
//! Accepts what users typically paste into a shortener: an optional `http`/`https`
//! scheme, a dotted host with an alphabetic TLD, an optional port and an optional
//! path. No normalization is applied; the URL is stored exactly as submitted.

use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

use crate::error::AppError;

static URL_SHAPE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?([a-zA-Z0-9\-]+\.)+[a-zA-Z]{2,}(:[0-9]{1,5})?(/[^\s]*)?$")
        .expect("URL shape pattern is valid")
});

/// Returns true if `url` matches the accepted URL shape.
pub fn is_valid_url(url: &str) -> bool {
    URL_SHAPE_REGEX.is_match(url)
}

/// Validates `url`, returning [`AppError::Validation`] when it is malformed.
pub fn validate_url(url: &str) -> Result<(), AppError> {
    if is_valid_url(url) {
        Ok(())
    } else {
        Err(AppError::bad_request(
            "Invalid URL",
            json!({ "url": url, "reason": "expected [scheme://]host.tld[:port][/path]" }),
        ))
    }
}
