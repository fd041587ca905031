//! Tenant status value object
//!
//! Represents where a tenant is in its lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// Lifecycle status of a tenant
///
/// Tenants are never hard-deleted; `Deleted` is a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    /// Tenant is operating normally
    Active,
    /// Tenant rejects new writes but stays visible to administrators
    Suspended,
    /// Tenant has been retired
    Deleted,
}

impl TenantStatus {
    /// Check if the tenant accepts write operations
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Storage / wire representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Deleted => "deleted",
        }
    }

    /// Check whether moving to `next` is allowed
    ///
    /// `active <-> suspended`, `active | suspended -> deleted`. Setting the
    /// current status again is a no-op and allowed.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Active | Self::Suspended | Self::Deleted)
                | (Self::Suspended, Self::Active | Self::Suspended | Self::Deleted)
                | (Self::Deleted, Self::Deleted)
        )
    }

    /// Validate a transition, returning the target status
    pub fn transition_to(&self, next: Self) -> Result<Self, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TenantStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "deleted" => Ok(Self::Deleted),
            other => Err(DomainError::ValidationError(format!(
                "unknown tenant status '{other}'"
            ))),
        }
    }
}
