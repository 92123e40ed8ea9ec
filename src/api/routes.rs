//! API route configuration.

use crate::api::handlers::{resolve_handler, shorten_handler, stats_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Link routes.
///
/// # Endpoints
///
/// - `POST /shorten`               - Create a short link
/// - `GET  /shorten/{code}`        - Resolve a short code (counted as an access)
/// - `GET  /shorten/{code}/stats`  - Link with its access count
pub fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/shorten/{code}", get(resolve_handler))
        .route("/shorten/{code}/stats", get(stats_handler))
}
