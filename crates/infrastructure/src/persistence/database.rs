//! SQLite database handle using sqlx
//!
//! One type serves both schemas: the platform database (tenant directory)
//! and each tenant's own database. Migrations are embedded with sqlx's
//! `migrate!()` macro from the workspace `migrations/` directory.

use std::{path::Path, str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::{debug, info, instrument};

static PLATFORM_MIGRATIONS: Migrator = sqlx::migrate!("../../migrations/platform");
static TENANT_MIGRATIONS: Migrator = sqlx::migrate!("../../migrations/tenant");

/// Error type for database setup
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which set of migrations a database carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// Tenant registry and domains
    Platform,
    /// Per-tenant tab access and patient accounts
    Tenant,
}

impl Schema {
    const fn migrator(self) -> &'static Migrator {
        match self {
            Self::Platform => &PLATFORM_MIGRATIONS,
            Self::Tenant => &TENANT_MIGRATIONS,
        }
    }
}

/// Configuration for a database connection pool
#[derive(Debug, Clone)]
pub struct SqliteDatabaseConfig {
    /// Database URL (e.g., "sqlite:data.db" or "sqlite::memory:")
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to keep open
    pub min_connections: u32,
    /// Enable WAL mode for better concurrency
    pub wal_mode: bool,
    /// Enable foreign keys
    pub foreign_keys: bool,
    /// How long a connection waits on a locked database
    pub busy_timeout: Duration,
    /// Create the file if missing; existing-only pools also leave the
    /// journal mode untouched
    pub create_if_missing: bool,
}

impl Default for SqliteDatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:caregate-platform.db".to_string(),
            max_connections: 5,
            min_connections: 1,
            wal_mode: true,
            foreign_keys: true,
            busy_timeout: Duration::from_secs(5),
            create_if_missing: true,
        }
    }
}

impl SqliteDatabaseConfig {
    /// Create an in-memory database configuration for testing
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1, // Single connection for in-memory
            min_connections: 1,
            wal_mode: false,
            ..Default::default()
        }
    }

    /// Create a file-based database configuration
    #[must_use]
    pub fn file(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().display().to_string();
        Self {
            url: format!("sqlite:{path_str}"),
            ..Default::default()
        }
    }

    #[must_use]
    pub const fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        if self.min_connections > max_connections {
            self.min_connections = max_connections;
        }
        self
    }

    /// Only open a database file that already exists
    #[must_use]
    pub const fn existing_only(mut self) -> Self {
        self.create_if_missing = false;
        self
    }

    fn is_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

/// SQLite connection pool
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open a connection pool
    #[instrument(skip_all, fields(url = %config.url))]
    pub async fn new(config: &SqliteDatabaseConfig) -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(config.create_if_missing)
            .foreign_keys(config.foreign_keys)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_with(options)
            .await?;

        if config.wal_mode && config.create_if_missing && !config.is_memory() {
            sqlx::query("PRAGMA journal_mode=WAL")
                .execute(&pool)
                .await?;
            sqlx::query("PRAGMA synchronous=NORMAL")
                .execute(&pool)
                .await?;
            debug!("WAL mode enabled");
        }

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        Ok(Self { pool })
    }

    /// Create an in-memory database for testing
    pub async fn in_memory() -> Result<Self, DatabaseError> {
        Self::new(&SqliteDatabaseConfig::in_memory()).await
    }

    /// Get the underlying pool for raw queries
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    #[must_use]
    pub fn into_pool(self) -> SqlitePool {
        self.pool
    }

    /// Run pending migrations of the given schema
    #[instrument(skip(self))]
    pub async fn migrate(&self, schema: Schema) -> Result<(), DatabaseError> {
        schema.migrator().run(&self.pool).await?;
        debug!("Database migrations completed");
        Ok(())
    }

    /// Close all connections in the pool
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Database pool closed");
    }
}
