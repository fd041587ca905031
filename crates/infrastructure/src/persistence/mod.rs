//! Persistence module
//!
//! SQLite storage via sqlx: the platform database holding the tenant
//! directory, and one database per tenant for tab access and patient
//! accounts.

mod access_grant_store;
mod database;
pub mod error;
mod patient_accounts;
mod tenant_directory;

pub use access_grant_store::SqliteAccessGrantStore;
pub use database::{DatabaseError, Schema, SqliteDatabase, SqliteDatabaseConfig};
pub use error::map_sqlx_error;
pub use patient_accounts::SqlitePatientAccounts;
pub use tenant_directory::SqliteTenantDirectory;
