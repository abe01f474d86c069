//! Error types for the library catalog

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// PostgreSQL SQLSTATE for a unique constraint violation
const PG_UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL SQLSTATE for a foreign key violation
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("Cannot delete: {0}")]
    DependencyExists(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Human-readable message without the error-kind prefix, for display in forms.
    /// Driver errors are reduced to a generic text; `Display` keeps the detail for logs.
    pub fn message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::IntegrityViolation(msg)
            | AppError::DependencyExists(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::Database(_) => "Database error".to_string(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = e {
            match db.code().as_deref() {
                Some(PG_UNIQUE_VIOLATION) | Some(PG_FOREIGN_KEY_VIOLATION) => {
                    return AppError::IntegrityViolation(db.message().to_string());
                }
                _ => {}
            }
        }
        AppError::Database(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let messages: Vec<String> = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| match err.message {
                    Some(ref msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();

        AppError::Validation(messages.join("; "))
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NotFound", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "ValidationError", msg.clone()),
            AppError::IntegrityViolation(msg) => {
                (StatusCode::CONFLICT, "IntegrityViolation", msg.clone())
            }
            AppError::DependencyExists(msg) => {
                (StatusCode::CONFLICT, "DependencyExists", msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected",
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: kind.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
