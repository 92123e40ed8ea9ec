//! Cache service trait and error types.

use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for a fast, ephemeral key-value cache of serialized link records.
///
/// Implementations report failures honestly; deciding that a failure means
/// "miss" or "no-op" is the job of the caller
/// ([`crate::application::services::LinkStore`]), which never lets a cache
/// error reach a client.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process cache (moka)
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` on cache hit
    /// - `Ok(None)` on cache miss or expired entry
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key`.
    ///
    /// `ttl` overrides the implementation's default time-to-live.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()>;

    /// Stores `value` under `key` only if no entry exists.
    ///
    /// Returns `true` if the value was written. Used to refill the cache after a
    /// read miss, so a refill never replaces a record written by a newer update.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Option<Duration>)
    -> CacheResult<bool>;

    /// Removes the entry for `key`. Removing a missing key is not an error.
    async fn invalidate(&self, key: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    ///
    /// Used by the health check endpoint to report cache status.
    async fn health_check(&self) -> bool;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}
