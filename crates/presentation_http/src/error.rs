//! API error handling
//!
//! Maps application errors onto HTTP status codes with a uniform JSON body.
//! In production mode, internal errors return generic messages without details.

use std::sync::atomic::{AtomicBool, Ordering};

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Global flag to control error detail exposure
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(true);

/// Configure whether internal error details should be exposed in responses.
///
/// Set to `false` in production so storage paths and driver messages never
/// reach clients.
pub fn set_expose_internal_errors(expose: bool) {
    EXPOSE_INTERNAL_ERRORS.store(expose, Ordering::SeqCst);
}

fn should_expose_details() -> bool {
    EXPOSE_INTERNAL_ERRORS.load(Ordering::SeqCst)
}

/// Replace messages that look like they carry paths or connection strings
fn sanitize_error_message(msg: &str) -> String {
    if should_expose_details() {
        return msg.to_string();
    }

    let sensitive_patterns = [
        "/home/", "/var/", "/etc/", "/tmp/", "C:\\", "sqlite:", ".db", ".rs:", "panicked at",
    ];
    let msg_lower = msg.to_lowercase();
    if sensitive_patterns
        .iter()
        .any(|pattern| msg_lower.contains(&pattern.to_lowercase()))
    {
        return "An error occurred processing your request".to_string();
    }

    msg.to_string()
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Tenant not found: {0}")]
    TenantNotFound(String),

    #[error("Tenant inactive: {0}")]
    TenantInactive(String),

    #[error("Tenant unavailable: {0}")]
    TenantUnavailable(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                sanitize_error_message(msg),
                None,
            ),
            Self::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "not_found",
                sanitize_error_message(msg),
                None,
            ),
            Self::TenantNotFound(msg) => (
                StatusCode::NOT_FOUND,
                "tenant_not_found",
                sanitize_error_message(msg),
                None,
            ),
            Self::TenantInactive(msg) => (
                StatusCode::FORBIDDEN,
                "tenant_inactive",
                sanitize_error_message(msg),
                None,
            ),
            Self::TenantUnavailable(msg) => {
                let sanitized = if should_expose_details() {
                    msg.clone()
                } else {
                    "Tenant temporarily unavailable".to_string()
                };
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "tenant_unavailable",
                    sanitized,
                    None,
                )
            },
            Self::Conflict(msg) => (
                StatusCode::CONFLICT,
                "conflict",
                sanitize_error_message(msg),
                None,
            ),
            Self::Internal(msg) => {
                let details = should_expose_details().then(|| msg.clone());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    details,
                )
            },
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Domain(e) => Self::BadRequest(e.to_string()),
            ApplicationError::Validation(msg) => Self::BadRequest(msg),
            ApplicationError::TenantNotFound(msg) => Self::TenantNotFound(msg),
            e @ ApplicationError::TenantInactive { .. } => Self::TenantInactive(e.to_string()),
            ApplicationError::TenantUnavailable(msg) => Self::TenantUnavailable(msg),
            ApplicationError::NotFound(msg) => Self::NotFound(msg),
            ApplicationError::Conflict(msg) => Self::Conflict(msg),
            ApplicationError::Persistence(msg)
            | ApplicationError::Configuration(msg)
            | ApplicationError::Internal(msg) => Self::Internal(msg),
        }
    }
}
