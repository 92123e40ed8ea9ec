//! Application error type and its HTTP mapping.
//!
//! Every fallible operation in the service layer returns [`AppError`]. Handlers
//! return it directly and rely on the [`IntoResponse`] impl to render a JSON
//! error body:
//!
//! ```json
//! { "error": { "code": "not_found", "message": "Short link not found", "details": {} } }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::utils::db_error::is_unique_violation_on_code;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error description included in every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// User-correctable input problem (malformed URL, bad JSON body).
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// A unique constraint rejected the write.
    #[error("{message}")]
    Conflict { message: String, details: Value },

    /// The persistent store failed or timed out.
    #[error("{message}")]
    Internal { message: String, details: Value },

    /// The persistent store could not be reached before the statement was sent;
    /// safe to retry.
    #[error("{message}")]
    Unavailable { message: String, details: Value },

    #[error("Failed to generate a unique short code after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }

    /// Returns true if the operation may be retried without risk of applying it twice.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Internal { .. } | Self::GenerationExhausted { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Converts the error into the serializable body used in responses.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, details) = match self {
            Self::Validation { details, .. } => ("validation_error", details.clone()),
            Self::NotFound { details, .. } => ("not_found", details.clone()),
            Self::Conflict { details, .. } => ("conflict", details.clone()),
            Self::Internal { details, .. } => ("internal_error", details.clone()),
            Self::Unavailable { details, .. } => ("service_unavailable", details.clone()),
            Self::GenerationExhausted { attempts } => (
                "code_generation_exhausted",
                json!({ "attempts": attempts }),
            ),
        };

        ErrorInfo {
            code,
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort();
        AppError::bad_request("Request validation failed", json!({ "fields": fields }))
    }
}

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if is_unique_violation_on_code(&e) {
        return AppError::conflict(
            "Short code already exists",
            json!({ "constraint": "urls_short_code_key" }),
        );
    }

    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }
    }

    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            AppError::unavailable("Database connection unavailable", json!({}))
        }
        other => {
            tracing::error!("Database error: {}", other);
            AppError::internal("Database error", json!({}))
        }
    }
}
