//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod access_grant_store;
mod patient_account_port;
mod tenant_connection_port;
mod tenant_directory;

pub use access_grant_store::AccessGrantStore;
#[cfg(test)]
pub use access_grant_store::MockAccessGrantStore;
#[cfg(test)]
pub use patient_account_port::MockPatientAccountPort;
pub use patient_account_port::PatientAccountPort;
#[cfg(test)]
pub use tenant_connection_port::MockTenantConnectionPort;
pub use tenant_connection_port::{AccessIntent, TenantConnectionPort};
#[cfg(test)]
pub use tenant_directory::MockTenantDirectoryPort;
pub use tenant_directory::{NewTenant, TenantDirectoryPort};
