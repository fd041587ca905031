//! Tenant connection port
//!
//! The connection router itself lives in the infrastructure layer because
//! its handle type is storage specific. The application layer only needs
//! to express intent and to invalidate cached handles on lifecycle
//! changes.

use std::fmt;

use async_trait::async_trait;
use domain::TenantId;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

/// What a caller intends to do with a tenant handle
///
/// Deliberately has no `Default`: every caller must state whether it reads
/// or writes, since suspended tenants only accept reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessIntent {
    Read,
    Write,
}

impl AccessIntent {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for AccessIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Port for invalidating cached tenant handles
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TenantConnectionPort: Send + Sync {
    /// Close and drop the cached handle of a tenant
    ///
    /// Once this returns, no caller can obtain the old handle; the next
    /// lookup constructs a fresh one against the current tenant state.
    async fn evict(&self, tenant: TenantId);
}
