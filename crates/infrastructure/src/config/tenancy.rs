//! Tenant resolution and per-tenant connection settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tenancy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenancyConfig {
    /// Directory holding one SQLite database file per tenant
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Maximum connections of each tenant pool
    #[serde(default = "default_pool_size")]
    pub pool_max_connections: u32,

    /// Upper bound for opening a tenant pool, in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Cached pools unused for this long are closed
    #[serde(default = "default_handle_idle_secs")]
    pub handle_idle_secs: u64,

    /// Upper bound on cached tenant pools
    #[serde(default = "default_max_cached_handles")]
    pub max_cached_handles: u64,

    /// Honor the `X-Dev-Tenant` header (development environment only)
    #[serde(default)]
    pub dev_override_enabled: bool,

    /// Base domain for subdomain fallback, e.g. `example.com`
    #[serde(default)]
    pub base_domain: Option<String>,
}

fn default_data_dir() -> String {
    "tenants".to_string()
}

const fn default_pool_size() -> u32 {
    4
}

const fn default_connect_timeout_ms() -> u64 {
    3_000
}

const fn default_handle_idle_secs() -> u64 {
    600
}

const fn default_max_cached_handles() -> u64 {
    1_000
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            pool_max_connections: default_pool_size(),
            connect_timeout_ms: default_connect_timeout_ms(),
            handle_idle_secs: default_handle_idle_secs(),
            max_cached_handles: default_max_cached_handles(),
            dev_override_enabled: false,
            base_domain: None,
        }
    }
}

impl TenancyConfig {
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub const fn handle_idle(&self) -> Duration {
        Duration::from_secs(self.handle_idle_secs)
    }
}
