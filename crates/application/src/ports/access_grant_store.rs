//! Access grant storage port
//!
//! Persists the enabled-tab allow-list of one principal inside one
//! tenant's database. Implementations obtain the tenant's connection with
//! read intent for `get` and write intent for `upsert`, so isolation errors
//! surface from here unchanged.

use async_trait::async_trait;
use domain::{AccessGrant, CapabilitySet, PrincipalId, PrincipalKind, TenantId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for access grant persistence
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccessGrantStore: Send + Sync {
    /// Load the stored grant, if one was ever written
    ///
    /// Stored ids no longer in the catalog are dropped on read.
    async fn get(
        &self,
        tenant: TenantId,
        kind: PrincipalKind,
        principal: PrincipalId,
    ) -> Result<Option<AccessGrant>, ApplicationError>;

    /// Replace the whole grant in a single atomic upsert
    async fn upsert(
        &self,
        tenant: TenantId,
        kind: PrincipalKind,
        principal: PrincipalId,
        capabilities: &CapabilitySet,
    ) -> Result<AccessGrant, ApplicationError>;
}
