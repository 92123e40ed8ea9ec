//! Cache-aside access to links.
//!
//! The repository is the source of truth. The cache holds a time-bounded copy
//! of each record keyed by short code: populated on read misses, refreshed after
//! every write. Cache failures are logged and degrade to a miss (reads) or a
//! no-op (writes); they never fail an operation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheResult, CacheService};

/// Timing parameters for [`LinkStore`].
#[derive(Debug, Clone, Copy)]
pub struct StoreSettings {
    /// Lifetime of a cached record.
    pub cache_ttl: Duration,
    /// Upper bound for a single cache call.
    pub cache_timeout: Duration,
    /// Upper bound for a single repository call.
    pub query_timeout: Duration,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            cache_timeout: Duration::from_millis(500),
            query_timeout: Duration::from_secs(3),
        }
    }
}

/// Outcome of checking whether a candidate short code is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePresence {
    /// The store confirmed the code is not used.
    Available,
    /// The code was found in the cache or the store.
    Taken,
}

/// Cache-aside store over a [`LinkRepository`] and a [`CacheService`].
pub struct LinkStore {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    settings: StoreSettings,
}

impl LinkStore {
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        settings: StoreSettings,
    ) -> Self {
        Self {
            repository,
            cache,
            settings,
        }
    }

    /// Persists a new link, then caches it.
    ///
    /// # Errors
    ///
    /// Returns the repository error if the write fails; [`AppError::Conflict`]
    /// means the short code was taken concurrently.
    pub async fn put(&self, new_link: NewLink) -> Result<Link, AppError> {
        let link = self.query(self.repository.create(new_link)).await?;
        self.write_cache(&link).await;
        Ok(link)
    }

    /// Looks up a link, preferring the cache.
    ///
    /// A cache hit may carry a stale `access_count`. On a miss the record is
    /// read from the repository and written back to the cache unless an entry
    /// appeared in the meantime; a concurrent increment may have cached a newer
    /// count that this read predates.
    ///
    /// # Errors
    ///
    /// Returns an error only if the repository lookup fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        if let Some(link) = self.read_cache(code).await {
            debug!("Cache HIT for {}", code);
            return Ok(Some(link));
        }

        debug!("Cache MISS for {}", code);

        let Some(link) = self.query(self.repository.find_by_code(code)).await? else {
            return Ok(None);
        };

        self.refill_cache(&link).await;
        Ok(Some(link))
    }

    /// Atomically increments the access counter in the repository and
    /// refreshes the cached record with the authoritative row.
    ///
    /// Returns `Ok(None)` if the code is unknown to the repository.
    pub async fn increment_access_count(&self, code: &str) -> Result<Option<Link>, AppError> {
        let Some(link) = self
            .query(self.repository.increment_access_count(code))
            .await?
        else {
            return Ok(None);
        };

        self.write_cache(&link).await;
        Ok(Some(link))
    }

    /// Checks whether `code` is already used.
    ///
    /// A cache failure is treated as "not cached" and the repository is still
    /// consulted. Only a successful repository lookup can report
    /// [`CodePresence::Available`].
    ///
    /// # Errors
    ///
    /// Returns the repository error if the lookup fails; a failed lookup is
    /// never reported as available.
    pub async fn check_code(&self, code: &str) -> Result<CodePresence, AppError> {
        let cached = self
            .cache_call("get", code, self.cache.get(code))
            .await
            .flatten();
        if cached.is_some() {
            return Ok(CodePresence::Taken);
        }

        match self.query(self.repository.find_by_code(code)).await? {
            Some(_) => Ok(CodePresence::Taken),
            None => Ok(CodePresence::Available),
        }
    }

    /// Verifies that the repository answers within the query timeout.
    pub async fn ping_store(&self) -> Result<(), AppError> {
        self.query(self.repository.ping()).await
    }

    /// Reports cache backend health within the cache timeout.
    pub async fn cache_healthy(&self) -> bool {
        tokio::time::timeout(self.settings.cache_timeout, self.cache.health_check())
            .await
            .unwrap_or(false)
    }

    /// Name of the configured cache backend.
    pub fn cache_backend(&self) -> &'static str {
        self.cache.backend_name()
    }

    async fn read_cache(&self, code: &str) -> Option<Link> {
        let raw = self
            .cache_call("get", code, self.cache.get(code))
            .await
            .flatten()?;

        match serde_json::from_str::<Link>(&raw) {
            Ok(link) => Some(link),
            Err(e) => {
                warn!("Discarding undecodable cache entry for {}: {}", code, e);
                metrics::counter!("cache_errors_total", "op" => "decode").increment(1);
                self.cache_call("invalidate", code, self.cache.invalidate(code))
                    .await;
                None
            }
        }
    }

    /// Caches `link`, replacing any existing entry. Used after writes.
    async fn write_cache(&self, link: &Link) {
        let Some(payload) = encode(link) else {
            return;
        };

        self.cache_call(
            "set",
            &link.short_code,
            self.cache
                .set(&link.short_code, &payload, Some(self.settings.cache_ttl)),
        )
        .await;
    }

    /// Caches `link` only if no entry exists. Used after read misses.
    async fn refill_cache(&self, link: &Link) {
        let Some(payload) = encode(link) else {
            return;
        };

        let written = self
            .cache_call(
                "set_if_absent",
                &link.short_code,
                self.cache
                    .set_if_absent(&link.short_code, &payload, Some(self.settings.cache_ttl)),
            )
            .await;

        if written == Some(false) {
            debug!("Cache already refreshed for {}, keeping newer entry", link.short_code);
        }
    }

    /// Runs a cache call under the cache timeout, logging and swallowing failures.
    async fn cache_call<T>(
        &self,
        op: &'static str,
        code: &str,
        fut: impl Future<Output = CacheResult<T>>,
    ) -> Option<T> {
        match tokio::time::timeout(self.settings.cache_timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!("Cache {} failed for {}: {}", op, code, e);
                metrics::counter!("cache_errors_total", "op" => op).increment(1);
                None
            }
            Err(_) => {
                warn!(
                    "Cache {} timed out for {} after {}ms",
                    op,
                    code,
                    self.settings.cache_timeout.as_millis()
                );
                metrics::counter!("cache_errors_total", "op" => op).increment(1);
                None
            }
        }
    }

    /// Runs a repository call under the query timeout.
    async fn query<T>(
        &self,
        fut: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        tokio::time::timeout(self.settings.query_timeout, fut)
            .await
            .map_err(|_| {
                AppError::internal(
                    "Database query timed out",
                    json!({ "timeout_ms": self.settings.query_timeout.as_millis() as u64 }),
                )
            })?
    }
}

fn encode(link: &Link) -> Option<String> {
    match serde_json::to_string(link) {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!("Failed to serialize link {} for cache: {}", link.short_code, e);
            None
        }
    }
}
