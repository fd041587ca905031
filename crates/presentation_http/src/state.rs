//! Application state shared across handlers

use std::sync::Arc;

use application::{AccessControlService, TenantAdminService, TenantResolver};

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Maps request signals to a tenant
    pub resolver: Arc<TenantResolver>,
    /// Tab access reads and writes
    pub access_control: Arc<AccessControlService>,
    /// Tenant registry administration
    pub tenant_admin: Arc<TenantAdminService>,
}
