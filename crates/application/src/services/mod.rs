//! Application services - Use case implementations

mod access_control_service;
pub mod capability_strategy;
mod tenant_admin_service;
mod tenant_resolver;

pub use access_control_service::AccessControlService;
pub use capability_strategy::{
    AccessSubject, CapabilityStrategy, CapabilityStrategyTable, EffectiveCapabilities, Role,
};
pub use tenant_admin_service::TenantAdminService;
pub use tenant_resolver::{ResolverConfig, TenantResolver};
