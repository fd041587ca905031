//! Domain entities - Objects with identity and lifecycle

mod access_grant;
pub mod capability;
mod tenant;

pub use access_grant::{AccessGrant, CapabilitySet, EnabledCapabilities};
pub use capability::{
    CATALOG_VERSION, CapabilityDefinition, DASHBOARD, is_known_capability, list_capabilities,
};
pub use tenant::{Tenant, TenantContact, TenantDomain, TenantUpdate, VerificationStatus};
