//! Tenant administration service
//!
//! Platform-level operations on the tenant registry. Every status change
//! evicts the tenant's cached connection handle so the next lookup sees
//! the new status.

use std::{fmt, sync::Arc};

use domain::{
    DomainId, Hostname, Tenant, TenantDomain, TenantId, TenantStatus, TenantUpdate,
    VerificationStatus,
};
use tracing::{info, instrument};

use crate::{
    error::ApplicationError,
    ports::{NewTenant, TenantConnectionPort, TenantDirectoryPort},
};

/// Service for tenant registry administration
pub struct TenantAdminService {
    directory: Arc<dyn TenantDirectoryPort>,
    connections: Arc<dyn TenantConnectionPort>,
}

impl fmt::Debug for TenantAdminService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantAdminService").finish_non_exhaustive()
    }
}

impl TenantAdminService {
    pub fn new(
        directory: Arc<dyn TenantDirectoryPort>,
        connections: Arc<dyn TenantConnectionPort>,
    ) -> Self {
        Self {
            directory,
            connections,
        }
    }

    /// Get a tenant with its domains
    #[instrument(skip(self))]
    pub async fn get(&self, id: TenantId) -> Result<Tenant, ApplicationError> {
        self.directory
            .find_by_id(id)
            .await?
            .ok_or_else(|| tenant_not_found(id))
    }

    /// Register a new tenant
    #[instrument(skip(self, tenant), fields(code = %tenant.code))]
    pub async fn provision(&self, tenant: NewTenant) -> Result<Tenant, ApplicationError> {
        if tenant.name.trim().is_empty() {
            return Err(ApplicationError::Validation("tenant name must not be empty".into()));
        }
        let created = self.directory.create(&tenant).await?;
        info!(tenant_id = %created.id, "Tenant provisioned");
        Ok(created)
    }

    /// Update administrative fields
    #[instrument(skip(self, update))]
    pub async fn update(&self, id: TenantId, update: TenantUpdate) -> Result<Tenant, ApplicationError> {
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ApplicationError::Validation("tenant name must not be empty".into()));
        }
        if update.is_empty() {
            return self.get(id).await;
        }
        self.directory
            .update(id, &update)
            .await?
            .ok_or_else(|| tenant_not_found(id))
    }

    /// Register a hostname for a tenant
    ///
    /// Deleted tenants accept no new domains.
    #[instrument(skip(self))]
    pub async fn add_domain(
        &self,
        id: TenantId,
        hostname: &str,
        make_primary: bool,
    ) -> Result<TenantDomain, ApplicationError> {
        let hostname = Hostname::parse(hostname)?;
        let tenant = self.get(id).await?;
        if tenant.status == TenantStatus::Deleted {
            return Err(ApplicationError::TenantInactive {
                code: tenant.code.to_string(),
                status: tenant.status,
            });
        }

        let domain = self.directory.add_domain(id, &hostname, make_primary).await?;
        info!(host = %domain.hostname, primary = domain.is_primary, "Domain registered");
        Ok(domain)
    }

    /// Mark a tenant's domain as verified
    #[instrument(skip(self))]
    pub async fn verify_domain(
        &self,
        id: TenantId,
        domain_id: DomainId,
    ) -> Result<TenantDomain, ApplicationError> {
        self.directory
            .set_domain_verification(id, domain_id, VerificationStatus::Verified)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("domain {domain_id} of tenant {id}")))
    }

    /// Move a tenant to a new status and invalidate its cached handle
    ///
    /// # Errors
    ///
    /// Disallowed transitions fail with a domain error before anything is
    /// persisted. The write only applies if the status read here is still
    /// current; a concurrent change fails with [`ApplicationError::Conflict`].
    #[instrument(skip(self))]
    pub async fn change_status(
        &self,
        id: TenantId,
        status: TenantStatus,
    ) -> Result<Tenant, ApplicationError> {
        let current = self.get(id).await?;
        current.status.transition_to(status)?;
        if current.status == status {
            return Ok(current);
        }

        let updated = self
            .directory
            .set_status(id, current.status, status)
            .await?
            .ok_or_else(|| tenant_not_found(id))?;
        self.connections.evict(id).await;

        info!(from = %current.status, to = %status, "Tenant status changed");
        Ok(updated)
    }

    /// Whether the tenant registry is reachable
    pub async fn check_ready(&self) -> Result<(), ApplicationError> {
        self.directory.ping().await
    }
}

fn tenant_not_found(id: TenantId) -> ApplicationError {
    ApplicationError::TenantNotFound(format!("id {id}"))
}
