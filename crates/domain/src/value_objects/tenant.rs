//! Resolved tenant context
//!
//! [`ResolvedTenant`] is the result of tenant resolution. It is carried
//! through the request lifecycle so that every data access is scoped to the
//! correct tenant, and it exposes the tenant status so callers can apply
//! their own policy (resolution itself never rejects suspended tenants).
//!
//! # Examples
//!
//! ```
//! use domain::tenant::ResolvedTenant;
//! use domain::{TenantCode, TenantId, TenantStatus};
//!
//! let tenant = ResolvedTenant::new(
//!     TenantId::new(1),
//!     TenantCode::parse("acme").unwrap(),
//!     TenantStatus::Active,
//!     "Acme Clinic",
//! );
//! assert!(tenant.is_active());
//! ```

use serde::{Deserialize, Serialize};

use super::{TenantCode, TenantId, TenantStatus};

/// Identity and status of the tenant a request belongs to
///
/// # Thread Safety
///
/// `ResolvedTenant` is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTenant {
    id: TenantId,
    code: TenantCode,
    status: TenantStatus,
    name: String,
}

impl ResolvedTenant {
    /// Create a resolved tenant
    pub fn new(
        id: TenantId,
        code: TenantCode,
        status: TenantStatus,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            code,
            status,
            name: name.into(),
        }
    }

    pub const fn id(&self) -> TenantId {
        self.id
    }

    pub const fn code(&self) -> &TenantCode {
        &self.code
    }

    pub const fn status(&self) -> TenantStatus {
        self.status
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the tenant currently accepts writes
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
