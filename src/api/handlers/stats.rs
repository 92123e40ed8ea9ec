//! Handler for link statistics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns a link together with its access count.
///
/// # Endpoint
///
/// `GET /shorten/{code}/stats`
///
/// # Response
///
/// ```json
/// { "id": "0b6f…", "url": "example.com/page", "short_code": "Xk3p9QaZ", "access_count": 3 }
/// ```
///
/// The count may lag behind very recent resolutions while their increments
/// are still queued. Calling this endpoint does not change the count.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<StatsResponse>, AppError> {
    let link = state.link_service.stats(&code).await?;
    Ok(Json(link.into()))
}
