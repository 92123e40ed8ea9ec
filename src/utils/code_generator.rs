//! Short code generation.
//!
//! Codes are derived from the target URL and a time-based salt rather than from a
//! shared counter, so no sequence state is needed across instances. Uniqueness
//! is not guaranteed here; callers must check for collisions
//! (see [`crate::application::services::LinkService`]).

use base64::Engine as _;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicI64, Ordering};

/// Number of characters in a generated short code.
pub const CODE_LENGTH: usize = 8;

/// Last salt handed out by [`next_salt`].
static LAST_SALT: AtomicI64 = AtomicI64::new(0);

/// Generates an 8-character alphanumeric short code for `url`.
///
/// Two calls with the same URL produce different codes because each call uses
/// a fresh, strictly increasing nanosecond salt.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code("example.com/page");
/// assert_eq!(code.len(), 8);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(url: &str) -> String {
    loop {
        if let Some(code) = generate_code_with_salt(url, next_salt()) {
            return code;
        }
    }
}

/// Deterministic core of [`generate_code`].
///
/// Hashes `url` followed by the decimal `salt` with SHA-256, encodes the digest
/// with the URL-safe base64 alphabet, drops every non-alphanumeric character
/// (`-`, `_` and padding) and keeps the first [`CODE_LENGTH`] characters.
///
/// Returns `None` in the (practically impossible) case where the digest does not
/// contain enough alphanumeric characters.
pub fn generate_code_with_salt(url: &str, salt: i64) -> Option<String> {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(salt.to_string().as_bytes());
    let digest = hasher.finalize();

    let encoded = base64::engine::general_purpose::URL_SAFE.encode(digest);
    let code: String = encoded
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(CODE_LENGTH)
        .collect();

    (code.len() == CODE_LENGTH).then_some(code)
}

/// Returns the current Unix time in nanoseconds, bumped so that it is strictly
/// greater than any salt previously returned by this process.
fn next_salt() -> i64 {
    let now = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros().saturating_mul(1_000));

    let previous = LAST_SALT
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last.saturating_add(1)))
        })
        .unwrap_or(now);

    now.max(previous.saturating_add(1))
}
