//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`   - Health check: DB, cache, access queue
//! - `/shorten/*`     - Link API
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Cross-origin access for browser clients
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{cors, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `cors_origins` - allowed origins; empty or `*` allows any origin
pub fn app_router(state: AppState, cors_origins: &[String]) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(api::routes::link_routes())
        .with_state(state)
        .layer(cors::layer(cors_origins))
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
