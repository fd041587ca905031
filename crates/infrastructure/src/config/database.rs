//! Platform database settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::default_true;
use crate::persistence::SqliteDatabaseConfig;

/// Platform database holding the tenant directory
///
/// Tenant databases are configured separately under `tenancy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file of the tenant directory
    #[serde(default = "default_db_path")]
    pub path: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Apply pending platform migrations at startup
    #[serde(default = "default_true")]
    pub run_migrations: bool,

    /// Wait on a locked database before failing, in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_db_path() -> String {
    "caregate-platform.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_busy_timeout_ms() -> u64 {
    5000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
            run_migrations: true,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    /// Pool settings for the platform database file
    #[must_use]
    pub fn pool_config(&self) -> SqliteDatabaseConfig {
        let mut config =
            SqliteDatabaseConfig::file(&self.path).with_max_connections(self.max_connections);
        config.busy_timeout = Duration::from_millis(self.busy_timeout_ms);
        config
    }
}
