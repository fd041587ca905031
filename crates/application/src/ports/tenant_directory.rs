//! Tenant directory port
//!
//! Defines the interface to the authoritative tenant registry (the
//! platform database). Lookups by code and by hostname are expected to be
//! backed by unique indexes.

use async_trait::async_trait;
use domain::{
    DomainId, Hostname, Tenant, TenantCode, TenantContact, TenantDomain, TenantId, TenantStatus,
    TenantUpdate, VerificationStatus,
};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Data required to register a new tenant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTenant {
    pub code: TenantCode,
    pub name: String,
    pub contact: TenantContact,
}

impl NewTenant {
    pub fn new(code: TenantCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            contact: TenantContact::default(),
        }
    }

    #[must_use]
    pub fn with_contact(mut self, contact: TenantContact) -> Self {
        self.contact = contact;
        self
    }
}

/// Port for the tenant registry
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TenantDirectoryPort: Send + Sync {
    /// Get a tenant with its domains by numeric id
    async fn find_by_id(&self, id: TenantId) -> Result<Option<Tenant>, ApplicationError>;

    /// Get a tenant with its domains by its unique code
    async fn find_by_code(&self, code: &TenantCode) -> Result<Option<Tenant>, ApplicationError>;

    /// Get the tenant owning an exact (normalized) hostname
    ///
    /// Returns the owner regardless of verification state; routing policy
    /// is applied by the caller.
    async fn find_by_hostname(&self, hostname: &Hostname)
    -> Result<Option<Tenant>, ApplicationError>;

    /// Register a new tenant in `active` status
    ///
    /// Fails with [`ApplicationError::Validation`] if the code is taken.
    async fn create(&self, tenant: &NewTenant) -> Result<Tenant, ApplicationError>;

    /// Apply a partial update to administrative fields
    ///
    /// Returns `None` if the tenant does not exist.
    async fn update(
        &self,
        id: TenantId,
        update: &TenantUpdate,
    ) -> Result<Option<Tenant>, ApplicationError>;

    /// Persist a new status if the stored one is still `from`
    ///
    /// Returns `None` if the tenant does not exist and fails with
    /// [`ApplicationError::Conflict`] if its status is no longer `from`.
    /// Transition rules are enforced by the caller against `from`.
    async fn set_status(
        &self,
        id: TenantId,
        from: TenantStatus,
        to: TenantStatus,
    ) -> Result<Option<Tenant>, ApplicationError>;

    /// Register a hostname for a tenant
    ///
    /// The first domain of a tenant is always primary. When `make_primary`
    /// is set, the previous primary is demoted in the same transaction.
    /// Fails with [`ApplicationError::Validation`] if the hostname is
    /// already registered, [`ApplicationError::NotFound`] if the tenant
    /// does not exist.
    async fn add_domain(
        &self,
        id: TenantId,
        hostname: &Hostname,
        make_primary: bool,
    ) -> Result<TenantDomain, ApplicationError>;

    /// Record the verification outcome of a tenant's domain
    ///
    /// Returns `None` if the domain does not belong to the tenant.
    async fn set_domain_verification(
        &self,
        id: TenantId,
        domain_id: DomainId,
        status: VerificationStatus,
    ) -> Result<Option<TenantDomain>, ApplicationError>;

    /// Lightweight connectivity check of the registry
    async fn ping(&self) -> Result<(), ApplicationError>;
}
