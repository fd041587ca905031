//! Value Objects - Immutable, identity-less domain primitives

mod domain_id;
mod hostname;
mod principal;
pub mod tenant;
mod tenant_code;
mod tenant_id;
mod tenant_status;

pub use domain_id::DomainId;
pub use hostname::Hostname;
pub use principal::{PrincipalId, PrincipalKind};
pub use tenant::ResolvedTenant;
pub use tenant_code::{MAX_TENANT_CODE_LEN, MIN_TENANT_CODE_LEN, TenantCode};
pub use tenant_id::TenantId;
pub use tenant_status::TenantStatus;
