//! Error types for the HTTP API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.
//! Client mistakes become `400` with a descriptive message; store failures
//! become `500` with a generic message and the details go to the log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crowdmap_db::DbError;

/// Message returned to clients for any unexpected failure.
pub const GENERIC_FAILURE: &str = "An unexpected error occurred";

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required field or parameter is missing or malformed.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The observation store failed.
    #[error("store error: {0}")]
    Store(#[from] DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(msg) => {
                tracing::warn!(error = %msg, "Rejected request");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::Store(e) => {
                tracing::error!(error = %e, "Store operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_owned())
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
