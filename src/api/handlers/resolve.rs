//! Handler for short code resolution.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::shorten::LinkResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Resolves a short code to its original URL.
///
/// # Endpoint
///
/// `GET /shorten/{code}`
///
/// Every successful call is counted as an access. The count is updated in the
/// background and is not part of this response.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn resolve_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.resolve(&code).await?;
    Ok(Json(link.into()))
}
