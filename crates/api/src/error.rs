use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crm_core::contact::DUPLICATE_EMAIL_MESSAGE;
use crm_core::error::CoreError;

use crate::response::ErrorBody;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the `{ success: false, ... }`
/// envelope every endpoint shares.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `crm_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A malformed request (bad JSON, wrong shape) with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, .. } => (
                    StatusCode::NOT_FOUND,
                    ErrorBody::new(format!("{entity} not found")),
                ),
                CoreError::InvalidId { entity, .. } => (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::new(format!("Invalid {} ID", entity.to_lowercase())),
                ),
                CoreError::Validation(errors) => (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::new("Validation Error").with_errors(errors),
                ),
                CoreError::DuplicateKey(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg)),
                CoreError::ContactNotFound(id) => {
                    tracing::debug!(contact_id = id, "Referenced contact does not exist");
                    (StatusCode::NOT_FOUND, ErrorBody::new("Contact not found"))
                }
                CoreError::Internal(msg) => server_error(msg),
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg)),
            AppError::InternalError(msg) => server_error(msg),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// 500 with the raw error text surfaced in `error`.
fn server_error(detail: String) -> (StatusCode, ErrorBody) {
    tracing::error!(error = %detail, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorBody::new("Server Error").with_detail(detail),
    )
}

/// Classify a sqlx error into an HTTP status and envelope.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map
///   to 400, the duplicate-key status of this API.
/// - Everything else maps to 500 carrying the raw error text.
fn classify_sqlx_error(err: sqlx::Error) -> (StatusCode, ErrorBody) {
    if let sqlx::Error::RowNotFound = err {
        return (
            StatusCode::NOT_FOUND,
            ErrorBody::new("Resource not found"),
        );
    }
    if let sqlx::Error::Database(db_err) = &err {
        // PostgreSQL unique constraint violation: error code 23505
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint == "uq_contacts_email" {
                return (StatusCode::BAD_REQUEST, ErrorBody::new(DUPLICATE_EMAIL_MESSAGE));
            }
            if constraint.starts_with("uq_") {
                return (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::new(format!(
                        "Duplicate value violates unique constraint: {constraint}"
                    )),
                );
            }
        }
    }
    server_error(err.to_string())
}
