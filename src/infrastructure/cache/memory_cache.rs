//! In-process cache implementation backed by moka.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expires every entry after the TTL it was written with.
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded in-process cache with per-entry TTL.
///
/// Suitable for single-instance deployments and as a fallback when Redis is
/// unreachable at startup. Entries are not shared between instances.
pub struct MemoryCache {
    inner: Cache<String, Entry>,
    default_ttl: Duration,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_capacity` entries.
    pub fn new(max_capacity: u64, default_ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();

        debug!(
            "MemoryCache initialized with max capacity: {}, default TTL: {}s",
            max_capacity,
            default_ttl.as_secs()
        );

        Self { inner, default_ttl }
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.inner.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let entry = Entry {
            value: value.to_string(),
            ttl: ttl.unwrap_or(self.default_ttl),
        };
        self.inner.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> CacheResult<bool> {
        let entry = Entry {
            value: value.to_string(),
            ttl: ttl.unwrap_or(self.default_ttl),
        };
        let slot = self.inner.entry(key.to_string()).or_insert(entry).await;
        Ok(slot.is_fresh())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        self.inner.invalidate(key).await;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::new(100, Duration::from_secs(3600));
        cache.set("abcd1234", "payload", None).await.unwrap();

        assert_eq!(
            cache.get("abcd1234").await.unwrap().as_deref(),
            Some("payload")
        );
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let cache = MemoryCache::new(100, Duration::from_secs(3600));
        cache.set("abcd1234", "old", None).await.unwrap();
        cache.set("abcd1234", "new", None).await.unwrap();

        assert_eq!(cache.get("abcd1234").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_set_if_absent_keeps_existing_value() {
        let cache = MemoryCache::new(100, Duration::from_secs(3600));
        cache.set("abcd1234", "newer", None).await.unwrap();

        let written = cache.set_if_absent("abcd1234", "older", None).await.unwrap();

        assert!(!written);
        assert_eq!(
            cache.get("abcd1234").await.unwrap().as_deref(),
            Some("newer")
        );
    }

    #[tokio::test]
    async fn test_set_if_absent_fills_missing_key() {
        let cache = MemoryCache::new(100, Duration::from_secs(3600));

        let written = cache.set_if_absent("abcd1234", "value", None).await.unwrap();

        assert!(written);
        assert_eq!(
            cache.get("abcd1234").await.unwrap().as_deref(),
            Some("value")
        );
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let cache = MemoryCache::new(100, Duration::from_secs(3600));
        cache.set("abcd1234", "payload", None).await.unwrap();
        cache.invalidate("abcd1234").await.unwrap();

        assert!(cache.get("abcd1234").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryCache::new(100, Duration::from_secs(3600));
        cache
            .set("abcd1234", "payload", Some(Duration::from_millis(50)))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(cache.get("abcd1234").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_key_is_miss() {
        let cache = MemoryCache::new(100, Duration::from_secs(3600));
        assert!(cache.get("missing").await.unwrap().is_none());
    }
}
