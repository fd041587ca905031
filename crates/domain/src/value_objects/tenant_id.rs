//! Tenant identifier value object
//!
//! # Examples
//!
//! ```
//! use domain::TenantId;
//!
//! let tenant_id = TenantId::parse("42").unwrap();
//! assert_eq!(tenant_id.as_i64(), 42);
//! assert!(TenantId::parse("0").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Numeric tenant identifier assigned by the tenant directory
///
/// Tenants are isolated organizations sharing the deployment. The numeric id
/// is the key used by the connection router; the human-facing key is the
/// [`TenantCode`](super::TenantCode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(i64);

impl TenantId {
    /// Wrap a raw database id
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Parse a tenant ID from a path segment or header value
    ///
    /// # Examples
    ///
    /// ```
    /// use domain::TenantId;
    ///
    /// assert!(TenantId::parse("7").is_ok());
    /// assert!(TenantId::parse("-1").is_err());
    /// assert!(TenantId::parse("abc").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(DomainError::InvalidIdentifier(format!("tenant id '{s}'"))),
        }
    }

    /// Get the underlying integer
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TenantId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<TenantId> for i64 {
    fn from(id: TenantId) -> Self {
        id.0
    }
}
