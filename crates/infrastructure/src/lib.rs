//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: SQLite persistence
//! for the tenant directory and per-tenant stores, the tenant connection
//! router, configuration loading and logging setup.

pub mod config;
pub mod persistence;
pub mod provisioning;
pub mod routing;
pub mod telemetry;

pub use config::{AppConfig, DatabaseConfig, Environment, ServerConfig, TenancyConfig};
pub use persistence::{
    Schema, SqliteAccessGrantStore, SqliteDatabase, SqliteDatabaseConfig, SqlitePatientAccounts,
    SqliteTenantDirectory, map_sqlx_error,
};
pub use provisioning::provision_tenant;
pub use routing::{ConnectionRouter, HandleFactory, RouterConfig, SqlitePoolFactory, TenantRouter};
pub use telemetry::{DEFAULT_LOG_FILTER, LogFormat, init_logging};
