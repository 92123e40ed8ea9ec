//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{LinkResponse, ShortenRequest};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for a URL.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "example.com/page" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// { "id": "0b6f…", "url": "example.com/page", "short_code": "Xk3p9QaZ" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the body is malformed or the URL is invalid.
/// Returns 500/503 if the link could not be persisted.
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        AppError::bad_request(
            "Invalid request body",
            json!({ "reason": rejection.body_text() }),
        )
    })?;
    payload.validate()?;

    let link = state.link_service.create(&payload.url).await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}
