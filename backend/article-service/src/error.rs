/// Error types for Article Service
///
/// Every failure carries a kind so callers can tell "does not exist" from
/// "temporarily unavailable" without matching on messages.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use entity_cache::CacheError;
use thiserror::Error;

/// Result type for article-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Postgres unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Entity absent from the store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input, rejected before any store or cache access
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate resource
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or bad credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Relational store operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Cache write failed after the store was already updated
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Unauthorized,
    /// Store or cache I/O failure
    Infrastructure,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::Database(_) | AppError::Cache(_) => ErrorKind::Infrastructure,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Infrastructure => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_msg,
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return AppError::Conflict(db_err.message().to_string());
            }
        }
        AppError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
