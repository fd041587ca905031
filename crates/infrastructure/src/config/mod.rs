//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `database`: platform SQLite database settings
//! - `tenancy`: tenant resolution and per-tenant pools
//!
//! Sources, later ones winning: built-in defaults, optional `config.toml`,
//! environment variables prefixed `CAREGATE` with `__` between path
//! segments (e.g. `CAREGATE_TENANCY__BASE_DOMAIN`).

mod database;
mod server;
mod tenancy;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use database::DatabaseConfig;
pub use server::ServerConfig;
pub use tenancy::TenancyConfig;

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Application environment (development or production)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment - dev-only affordances may be enabled
    #[default]
    Development,
    /// Production environment
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment
    #[serde(default)]
    pub environment: Environment,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Platform database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Tenancy settings
    #[serde(default)]
    pub tenancy: TenancyConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (optional) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a named file (optional) and the environment
    pub fn load_from(file: &str) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix("CAREGATE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Whether the development tenant override header is honored
    ///
    /// Requires both the development environment and the explicit toggle.
    #[must_use]
    pub fn dev_override_active(&self) -> bool {
        self.environment == Environment::Development && self.tenancy.dev_override_enabled
    }
}
