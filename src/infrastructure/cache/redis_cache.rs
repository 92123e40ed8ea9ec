//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{
    AsyncCommands, Client, ExistenceCheck, SetExpiry, SetOptions, aio::ConnectionManager,
};
use std::time::Duration;
use tracing::{debug, info};

/// Redis cache implementation for fast link lookups.
///
/// Uses `ConnectionManager` for connection reuse and automatic reconnection.
/// Errors are returned to the caller, which decides how to degrade.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: Duration,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and configures the default TTL.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `default_ttl` - TTL applied when [`CacheService::set`] is called with `ttl = None`
    /// - `key_prefix` - Namespace prepended to every key (empty means the key is the short code)
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(
        redis_url: &str,
        default_ttl: Duration,
        key_prefix: impl Into<String>,
    ) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl,
            key_prefix: key_prefix.into(),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        let value = conn
            .get::<_, Option<String>>(&full_key)
            .await
            .map_err(|e| CacheError::OperationError(format!("GET {}: {}", full_key, e)))?;

        if value.is_some() {
            debug!("Cache HIT: {}", key);
        } else {
            debug!("Cache MISS: {}", key);
        }

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();
        let ttl_seconds = ttl.unwrap_or(self.default_ttl).as_secs().max(1);

        conn.set_ex::<_, _, ()>(&full_key, value, ttl_seconds)
            .await
            .map_err(|e| CacheError::OperationError(format!("SETEX {}: {}", full_key, e)))?;

        debug!("Cache SET: {} (TTL: {}s)", key, ttl_seconds);
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> CacheResult<bool> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();
        let ttl_seconds = ttl.unwrap_or(self.default_ttl).as_secs().max(1);

        let options = SetOptions::default()
            .conditional_set(ExistenceCheck::NX)
            .with_expiration(SetExpiry::EX(ttl_seconds));

        // SET ... NX replies OK when written and nil when the key exists.
        let reply = conn
            .set_options::<_, _, Option<String>>(&full_key, value, options)
            .await
            .map_err(|e| CacheError::OperationError(format!("SET NX {}: {}", full_key, e)))?;

        let written = reply.is_some();
        debug!("Cache SET NX: {} (written: {})", key, written);
        Ok(written)
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        let deleted = conn
            .del::<_, i32>(&full_key)
            .await
            .map_err(|e| CacheError::OperationError(format!("DEL {}: {}", full_key, e)))?;

        if deleted > 0 {
            debug!("Cache INVALIDATE: {}", key);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
