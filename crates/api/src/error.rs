//! Error types for the API server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::{DatabaseError, ValidationError};
use proposal_core::{AttributionError, AutofillError, GenerationError, ListingError};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Errors that can occur while handling a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(&'static str),

    /// Email lookup for a user that is not registered.
    #[error("User Does Not Exist")]
    UnknownUser,

    /// AI routes called while no generator is configured.
    #[error("Gemini API key is not configured")]
    NotConfigured,

    #[error(transparent)]
    Attribution(#[from] AttributionError),

    #[error(transparent)]
    Listing(#[from] ListingError),

    #[error(transparent)]
    Autofill(#[from] AutofillError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, String, Map<String, Value>) {
        let mut extra = Map::new();

        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            ApiError::UnknownUser => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::NotConfigured => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            ApiError::Attribution(AttributionError::NoValidUser) => (
                StatusCode::BAD_REQUEST,
                "No valid user found. Please log in or provide a user email.".to_string(),
            ),
            ApiError::Listing(err) => {
                extra.insert("error".to_string(), json!(err.to_string()));
                extra.insert("suggestion".to_string(), json!(err.suggestion()));
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch proposals".to_string(),
                )
            }
            ApiError::Autofill(err) => autofill_parts(err, &mut extra),
            ApiError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Database(DatabaseError::NotFound { entity, .. }) => {
                (StatusCode::NOT_FOUND, format!("{entity} not found"))
            }
            ApiError::Database(DatabaseError::AlreadyExists { entity, .. }) => {
                (StatusCode::CONFLICT, format!("{entity} already exists"))
            }
            ApiError::Database(err) => {
                extra.insert("error".to_string(), json!(err.to_string()));
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, message, extra)
    }
}

fn autofill_parts(err: &AutofillError, extra: &mut Map<String, Value>) -> (StatusCode, String) {
    match err {
        AutofillError::Unparseable => {
            extra.insert("details".to_string(), json!(err.to_string()));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to parse AI response. Please try again with a clearer description."
                    .to_string(),
            )
        }
        AutofillError::Generation(GenerationError::Unauthorized(_))
        | AutofillError::Generation(GenerationError::Configuration(_)) => (
            StatusCode::UNAUTHORIZED,
            "Invalid or missing Gemini API key".to_string(),
        ),
        AutofillError::Generation(GenerationError::RateLimited(_)) => (
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded. Please try again later.".to_string(),
        ),
        AutofillError::Generation(inner) => {
            extra.insert("details".to_string(), json!(inner.to_string()));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate autofill data".to_string(),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, extra) = self.parts();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let mut body = Map::new();
        body.insert("success".to_string(), json!(false));
        body.insert("message".to_string(), json!(message));
        body.extend(extra);

        (status, Json(Value::Object(body))).into_response()
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
