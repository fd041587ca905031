//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Tenant code is not a valid host-safe slug
    #[error("Invalid tenant code: {0}")]
    InvalidTenantCode(String),

    /// Hostname is malformed
    #[error("Invalid hostname: {0}")]
    InvalidHostname(String),

    /// Numeric identifier is not a positive integer
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Capability id is not part of the catalog for the principal kind
    #[error("Unknown capability for {kind}: {id}")]
    UnknownCapability { kind: String, id: String },

    /// Tenant status transition is not allowed
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Create an unknown capability error
    pub fn unknown_capability(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::UnknownCapability {
            kind: kind.into(),
            id: id.into(),
        }
    }
}
