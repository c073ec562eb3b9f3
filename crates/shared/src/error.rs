//! Application-wide error types.
//!
//! Every failure surfaced to a caller is classified by an [`ErrorKind`] and
//! carries a stable, machine-readable code that the API layer maps onto its
//! response envelope.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Error taxonomy shared by every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Field-scoped input problems, aggregable.
    Validation,
    /// A structural invariant would be broken (zero-sum, overlap, nesting).
    Invariant,
    /// The operation is not allowed in the current state (closed period, order).
    Policy,
    /// A referenced record does not exist.
    NotFound,
    /// The caller could not be identified.
    Unauthorized,
    /// Storage or other infrastructure failure.
    Infrastructure,
}

impl ErrorKind {
    /// Returns the HTTP status code associated with this kind.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::Policy => 409,
            Self::Invariant => 422,
            Self::Infrastructure => 500,
        }
    }
}

/// A single field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The offending field (for list inputs, the item key).
    pub field: String,
    /// Stable code for the failure.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Stable error code.
        code: &'static str,
        /// Description of what was missing.
        message: String,
    },

    /// One or more field validations failed.
    #[error("Validation error: {message}")]
    Validation {
        /// Stable error code.
        code: &'static str,
        /// Summary message.
        message: String,
        /// Individual field failures.
        fields: Vec<FieldError>,
    },

    /// A domain invariant or policy rejected the request.
    #[error("{message}")]
    Rejected {
        /// Whether this is an invariant or a policy rejection.
        kind: ErrorKind,
        /// Stable error code.
        code: &'static str,
        /// Description of the rejection.
        message: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Rejected { kind, .. } => *kind,
            Self::Database(_) | Self::Internal(_) => ErrorKind::Infrastructure,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound { code, .. }
            | Self::Validation { code, .. }
            | Self::Rejected { code, .. } => *code,
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the field errors attached to a validation failure.
    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        match self {
            Self::Validation { fields, .. } => fields,
            _ => &[],
        }
    }
}
