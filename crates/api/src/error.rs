//! JSON error envelope for every handler.
//!
//! Errors render as `{"error": CODE, "message": ..., "fields": [...]}` with
//! the status taken from the error's kind. `fields` is only present for
//! validation failures that carry field errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tallybook_core::AccountingError;
use tallybook_db::RepositoryError;
use tallybook_shared::AppError;
use tracing::error;

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Creates an unauthorized error with the given message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self(AppError::Unauthorized(message.into()))
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        Self(err.into())
    }
}

impl From<AccountingError> for ApiError {
    fn from(err: AccountingError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Infrastructure details stay in the logs.
        let message = if status.is_server_error() {
            error!(error = %err, "Request failed");
            "An internal error occurred".to_string()
        } else {
            err.to_string()
        };

        let mut body = json!({
            "error": err.error_code(),
            "message": message,
        });
        if !err.fields().is_empty() {
            body["fields"] = json!(err.fields());
        }

        (status, Json(body)).into_response()
    }
}
