//! Tenant provisioning
//!
//! Registers a tenant in the directory, attaches its primary hostname and
//! opens its database once so the per-tenant schema exists before the
//! first request. Used for seeding and tests.

use application::{
    error::ApplicationError,
    ports::{AccessIntent, NewTenant, TenantDirectoryPort},
};
use domain::{Hostname, Tenant};
use tracing::{info, instrument};

use crate::routing::TenantRouter;

/// Create a tenant with an optional primary hostname and warm its database
#[instrument(skip(directory, router, tenant), fields(code = %tenant.code))]
pub async fn provision_tenant(
    directory: &dyn TenantDirectoryPort,
    router: &TenantRouter,
    tenant: NewTenant,
    primary_hostname: Option<&Hostname>,
) -> Result<Tenant, ApplicationError> {
    let created = directory.create(&tenant).await?;

    if let Some(hostname) = primary_hostname {
        directory.add_domain(created.id, hostname, true).await?;
    }

    router.get_handle(created.id, AccessIntent::Write).await?;

    let tenant = directory
        .find_by_id(created.id)
        .await?
        .ok_or_else(|| ApplicationError::Internal(format!("tenant {} vanished", created.id)))?;
    info!(tenant_id = %tenant.id, "Tenant provisioned");
    Ok(tenant)
}
