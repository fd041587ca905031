//! Per-tenant SQLite pools
//!
//! Each tenant owns one database file, `{data_dir}/{code}.db`. The file
//! is created and migrated on the first open of an active tenant. Inactive
//! tenants only ever open an existing file, unmigrated.

use std::path::{Path, PathBuf};

use application::error::ApplicationError;
use async_trait::async_trait;
use domain::{ResolvedTenant, TenantCode};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::connection_router::{ConnectionRouter, HandleFactory};
use crate::{
    config::TenancyConfig,
    persistence::{Schema, SqliteDatabase, SqliteDatabaseConfig},
};

/// Router over per-tenant SQLite pools
pub type TenantRouter = ConnectionRouter<SqlitePoolFactory>;

/// Opens the pool of a tenant's database file
#[derive(Debug, Clone)]
pub struct SqlitePoolFactory {
    data_dir: PathBuf,
    max_connections: u32,
}

impl SqlitePoolFactory {
    pub fn new(data_dir: impl Into<PathBuf>, max_connections: u32) -> Self {
        Self {
            data_dir: data_dir.into(),
            max_connections: max_connections.max(1),
        }
    }

    #[must_use]
    pub fn from_config(config: &TenancyConfig) -> Self {
        Self::new(&config.data_dir, config.pool_max_connections)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Location of a tenant's database file
    #[must_use]
    pub fn database_path(&self, code: &TenantCode) -> PathBuf {
        self.data_dir.join(format!("{code}.db"))
    }
}

#[async_trait]
impl HandleFactory for SqlitePoolFactory {
    type Handle = SqlitePool;

    #[instrument(skip(self, tenant), fields(tenant = %tenant.code()))]
    async fn open(&self, tenant: &ResolvedTenant) -> Result<SqlitePool, ApplicationError> {
        let writable = tenant.status().is_active();
        if writable {
            tokio::fs::create_dir_all(&self.data_dir)
                .await
                .map_err(|e| ApplicationError::TenantUnavailable(format!("data directory: {e}")))?;
        }

        let path = self.database_path(tenant.code());
        let mut config =
            SqliteDatabaseConfig::file(&path).with_max_connections(self.max_connections);
        if !writable {
            config = config.existing_only();
        }

        let db = SqliteDatabase::new(&config)
            .await
            .map_err(|e| ApplicationError::TenantUnavailable(e.to_string()))?;
        if writable {
            db.migrate(Schema::Tenant)
                .await
                .map_err(|e| ApplicationError::TenantUnavailable(e.to_string()))?;
        }

        debug!(path = %path.display(), writable, "Tenant database ready");
        Ok(db.into_pool())
    }

    async fn close(&self, handle: SqlitePool) {
        handle.close().await;
    }
}

#[cfg(test)]
mod tests {
    use domain::{TenantId, TenantStatus};

    use super::*;

    fn tenant(code: &str) -> ResolvedTenant {
        tenant_in(code, TenantStatus::Active)
    }

    fn tenant_in(code: &str, status: TenantStatus) -> ResolvedTenant {
        ResolvedTenant::new(TenantId::new(1), TenantCode::parse(code).unwrap(), status, "Test")
    }

    #[tokio::test]
    async fn open_creates_migrated_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let factory = SqlitePoolFactory::new(dir.path().join("tenants"), 2);

        let pool = factory.open(&tenant("acme")).await.unwrap();
        assert!(dir.path().join("tenants").join("acme.db").exists());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM doctor_tab_access")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);

        factory.close(pool.clone()).await;
        assert!(pool.is_closed());
    }

    #[tokio::test]
    async fn tenants_get_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let factory = SqlitePoolFactory::new(dir.path(), 1);

        let acme = factory.open(&tenant("acme")).await.unwrap();
        let beta = factory.open(&tenant("beta")).await.unwrap();

        sqlx::query("INSERT INTO patients (full_name) VALUES ('Ada')")
            .execute(&acme)
            .await
            .unwrap();
        let in_beta: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patients")
            .fetch_one(&beta)
            .await
            .unwrap();
        assert_eq!(in_beta, 0);
    }

    #[tokio::test]
    async fn suspended_tenant_never_creates_a_database() {
        let dir = tempfile::tempdir().unwrap();
        let factory = SqlitePoolFactory::new(dir.path(), 1);

        let err = factory
            .open(&tenant_in("acme", TenantStatus::Suspended))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::TenantUnavailable(_)));
        assert!(!dir.path().join("acme.db").exists());
    }

    #[tokio::test]
    async fn suspended_tenant_opens_existing_database_unmigrated() {
        let dir = tempfile::tempdir().unwrap();
        let factory = SqlitePoolFactory::new(dir.path(), 1);
        let bare = SqliteDatabase::new(&SqliteDatabaseConfig::file(dir.path().join("acme.db")))
            .await
            .unwrap();
        bare.close().await;

        let pool = factory
            .open(&tenant_in("acme", TenantStatus::Suspended))
            .await
            .unwrap();
        let migrated: bool = sqlx::query_scalar(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE name = '_sqlx_migrations'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(!migrated);
    }

    #[tokio::test]
    async fn unwritable_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let factory = SqlitePoolFactory::new(blocker.join("tenants"), 1);
        let err = factory.open(&tenant("acme")).await.unwrap_err();
        assert!(matches!(err, ApplicationError::TenantUnavailable(_)));
    }

    #[test]
    fn database_path_uses_code() {
        let factory = SqlitePoolFactory::new("/data/tenants", 4);
        let path = factory.database_path(&TenantCode::parse("acme").unwrap());
        assert_eq!(path, PathBuf::from("/data/tenants/acme.db"));
    }
}
