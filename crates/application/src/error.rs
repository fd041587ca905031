//! Application-level errors

use domain::{DomainError, TenantStatus};
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// No tenant matches the request's domain or code
    #[error("Tenant not found: {0}")]
    TenantNotFound(String),

    /// Write attempted against a suspended or deleted tenant
    #[error("Tenant {code} is {status}")]
    TenantInactive { code: String, status: TenantStatus },

    /// Tenant backing store could not be reached
    #[error("Tenant unavailable: {0}")]
    TenantUnavailable(String),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Write lost a race against a concurrent change
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input rejected before any storage access
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Storage read or write failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TenantUnavailable(_) | Self::Persistence(_))
    }

    /// Errors that guard tenant isolation and must never be masked
    pub const fn is_isolation_failure(&self) -> bool {
        matches!(self, Self::TenantNotFound(_) | Self::TenantInactive { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(ApplicationError::TenantUnavailable("down".into()).is_retryable());
        assert!(ApplicationError::Persistence("locked".into()).is_retryable());
        assert!(!ApplicationError::TenantNotFound("acme".into()).is_retryable());
        assert!(!ApplicationError::Validation("bad".into()).is_retryable());
    }

    #[test]
    fn isolation_failures() {
        let inactive = ApplicationError::TenantInactive {
            code: "acme".into(),
            status: TenantStatus::Suspended,
        };
        assert!(inactive.is_isolation_failure());
        assert!(ApplicationError::TenantNotFound("x".into()).is_isolation_failure());
        assert!(!ApplicationError::TenantUnavailable("x".into()).is_isolation_failure());
    }

    #[test]
    fn inactive_message_names_status() {
        let err = ApplicationError::TenantInactive {
            code: "acme".into(),
            status: TenantStatus::Suspended,
        };
        assert_eq!(err.to_string(), "Tenant acme is suspended");
    }

    #[test]
    fn domain_errors_convert() {
        let err: ApplicationError = DomainError::InvalidTenantCode("x".into()).into();
        assert!(matches!(err, ApplicationError::Domain(_)));
    }
}
