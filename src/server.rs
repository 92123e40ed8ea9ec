//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, worker spawning, and Axum server lifecycle.

use crate::application::access_worker::{self, run_access_worker};
use crate::application::services::{LinkService, LinkStore};
use crate::config::{CacheBackend, Config};
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::persistence::PgLinkRepository;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound for draining queued access events after the server stops.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Cache backend (Redis, in-process, or none)
/// - Background access worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Migrations applied");

    let cache = build_cache(&config).await;

    let link_repository = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    let link_store = Arc::new(LinkStore::new(
        link_repository,
        cache,
        config.store_settings(),
    ));

    let worker_settings = config.worker_settings();
    let (access_recorder, access_rx) = access_worker::channel(config.access_queue_capacity);
    let access_recorder = access_recorder.with_enqueue_timeout(worker_settings.task_timeout);

    let worker = tokio::spawn(run_access_worker(
        access_rx,
        link_store.clone(),
        worker_settings,
    ));
    tracing::info!("Access worker started");

    let link_service = Arc::new(LinkService::new(
        link_store.clone(),
        access_recorder.clone(),
        config.max_code_attempts,
    ));

    let state = AppState::new(link_service, link_store, access_recorder);
    let app = app_router(state, &config.cors_allowed_origins);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router and every recorder clone are gone, so the queue closes once
    // deferred events are delivered and the worker drains what is left.
    tracing::info!("Server stopped, draining access queue");
    match tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("Access worker panicked: {}", e),
        Err(_) => tracing::warn!(
            "Access worker did not drain within {:?}, pending increments are lost",
            WORKER_DRAIN_TIMEOUT
        ),
    }

    pool.close().await;
    Ok(())
}

/// Creates the PostgreSQL pool from the configured pool settings.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn connect_database(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");
    Ok(pool)
}

/// Selects the cache backend.
///
/// A Redis backend that cannot be reached at startup falls back to the
/// in-process cache instead of failing the service.
pub async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    let memory = || -> Arc<dyn CacheService> {
        Arc::new(MemoryCache::new(
            config.memory_cache_capacity,
            config.cache_ttl(),
        ))
    };

    match (config.cache_backend, &config.redis_url) {
        (CacheBackend::Redis, Some(redis_url)) => {
            match RedisCache::connect(redis_url, config.cache_ttl(), &config.redis_key_prefix)
                .await
            {
                Ok(redis) => {
                    tracing::info!("Cache enabled (Redis)");
                    Arc::new(redis)
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to Redis: {}. Using in-process cache.", e);
                    memory()
                }
            }
        }
        (CacheBackend::Redis, None) | (CacheBackend::Memory, _) => {
            tracing::info!("Cache enabled (in-process)");
            memory()
        }
        (CacheBackend::None, _) => {
            tracing::info!("Cache disabled (NullCache)");
            Arc::new(NullCache::new())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
