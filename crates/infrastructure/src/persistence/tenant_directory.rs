//! SQLite tenant directory
//!
//! Implements [`TenantDirectoryPort`] on the platform database. Lookups by
//! code and by hostname go through unique indexes.

use application::{
    error::ApplicationError,
    ports::{NewTenant, TenantDirectoryPort},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    DomainId, Hostname, Tenant, TenantCode, TenantContact, TenantDomain, TenantId, TenantStatus,
    TenantUpdate, VerificationStatus,
};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::error::map_sqlx_error;

const TENANT_COLUMNS: &str = "t.id, t.code, t.name, t.status, t.contact_email, t.contact_phone, \
                              t.address, t.created_at, t.updated_at";

/// Tenant directory backed by the platform database
#[derive(Debug, Clone)]
pub struct SqliteTenantDirectory {
    pool: SqlitePool,
}

impl SqliteTenantDirectory {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load(&self, row: Option<TenantRow>) -> Result<Option<Tenant>, ApplicationError> {
        let Some(row) = row else {
            return Ok(None);
        };

        let domains: Vec<DomainRow> = sqlx::query_as(
            r"
            SELECT id, hostname, is_primary, verification_status, created_at
            FROM tenant_domains WHERE tenant_id = $1 ORDER BY id
            ",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.into_tenant(domains).map(Some)
    }

    async fn find_domain(
        &self,
        id: TenantId,
        domain_id: DomainId,
    ) -> Result<Option<TenantDomain>, ApplicationError> {
        let row: Option<DomainRow> = sqlx::query_as(
            r"
            SELECT id, hostname, is_primary, verification_status, created_at
            FROM tenant_domains WHERE id = $1 AND tenant_id = $2
            ",
        )
        .bind(domain_id.as_i64())
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(DomainRow::into_domain).transpose()
    }
}

#[async_trait]
impl TenantDirectoryPort for SqliteTenantDirectory {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: TenantId) -> Result<Option<Tenant>, ApplicationError> {
        let row: Option<TenantRow> =
            sqlx::query_as(&format!("SELECT {TENANT_COLUMNS} FROM tenants t WHERE t.id = $1"))
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        self.load(row).await
    }

    #[instrument(skip(self), fields(code = %code))]
    async fn find_by_code(&self, code: &TenantCode) -> Result<Option<Tenant>, ApplicationError> {
        let row: Option<TenantRow> =
            sqlx::query_as(&format!("SELECT {TENANT_COLUMNS} FROM tenants t WHERE t.code = $1"))
                .bind(code.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        self.load(row).await
    }

    #[instrument(skip(self), fields(host = %hostname))]
    async fn find_by_hostname(
        &self,
        hostname: &Hostname,
    ) -> Result<Option<Tenant>, ApplicationError> {
        let row: Option<TenantRow> = sqlx::query_as(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants t \
             JOIN tenant_domains d ON d.tenant_id = t.id \
             WHERE d.hostname = $1"
        ))
        .bind(hostname.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        self.load(row).await
    }

    #[instrument(skip(self, tenant), fields(code = %tenant.code))]
    async fn create(&self, tenant: &NewTenant) -> Result<Tenant, ApplicationError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r"
            INSERT INTO tenants
                (code, name, status, contact_email, contact_phone, address, created_at, updated_at)
            VALUES ($1, $2, 'active', $3, $4, $5, $6, $6)
            ",
        )
        .bind(tenant.code.as_str())
        .bind(&tenant.name)
        .bind(&tenant.contact.email)
        .bind(&tenant.contact.phone)
        .bind(&tenant.contact.address)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| match map_sqlx_error(e) {
            ApplicationError::Validation(_) => ApplicationError::Validation(format!(
                "tenant code '{}' already exists",
                tenant.code
            )),
            other => other,
        })?;

        let id = TenantId::new(result.last_insert_rowid());
        debug!(tenant_id = %id, "Tenant created");
        self.find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::Internal(format!("tenant {id} vanished after insert")))
    }

    #[instrument(skip(self, update))]
    async fn update(
        &self,
        id: TenantId,
        update: &TenantUpdate,
    ) -> Result<Option<Tenant>, ApplicationError> {
        let result = sqlx::query(
            r"
            UPDATE tenants SET
                name = COALESCE($1, name),
                contact_email = COALESCE($2, contact_email),
                contact_phone = COALESCE($3, contact_phone),
                address = COALESCE($4, address),
                updated_at = $5
            WHERE id = $6
            ",
        )
        .bind(&update.name)
        .bind(&update.contact_email)
        .bind(&update.contact_phone)
        .bind(&update.address)
        .bind(Utc::now().to_rfc3339())
        .bind(id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    #[instrument(skip(self))]
    async fn set_status(
        &self,
        id: TenantId,
        from: TenantStatus,
        to: TenantStatus,
    ) -> Result<Option<Tenant>, ApplicationError> {
        let result = sqlx::query(
            "UPDATE tenants SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4",
        )
        .bind(to.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(id.as_i64())
        .bind(from.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(id).await? {
                None => Ok(None),
                Some(current) => Err(ApplicationError::Conflict(format!(
                    "tenant {id} is {}, expected {from}",
                    current.status
                ))),
            };
        }
        self.find_by_id(id).await
    }

    #[instrument(skip(self), fields(host = %hostname))]
    async fn add_domain(
        &self,
        id: TenantId,
        hostname: &Hostname,
        make_primary: bool,
    ) -> Result<TenantDomain, ApplicationError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let exists: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM tenants WHERE id = $1")
            .bind(id.as_i64())
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        if !exists {
            return Err(ApplicationError::NotFound(format!("tenant {id}")));
        }

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tenant_domains WHERE tenant_id = $1")
                .bind(id.as_i64())
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;

        // the first domain of a tenant is always primary
        let is_primary = make_primary || existing == 0;
        if is_primary && existing > 0 {
            sqlx::query(
                "UPDATE tenant_domains SET is_primary = 0 WHERE tenant_id = $1 AND is_primary = 1",
            )
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        let result = sqlx::query(
            r"
            INSERT INTO tenant_domains
                (tenant_id, hostname, is_primary, verification_status, created_at)
            VALUES ($1, $2, $3, 'pending', $4)
            ",
        )
        .bind(id.as_i64())
        .bind(hostname.as_str())
        .bind(is_primary)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| match map_sqlx_error(e) {
            ApplicationError::Validation(_) => {
                ApplicationError::Validation(format!("hostname '{hostname}' is already registered"))
            },
            other => other,
        })?;

        tx.commit().await.map_err(map_sqlx_error)?;

        let domain_id = DomainId::new(result.last_insert_rowid());
        debug!(domain_id = %domain_id, is_primary, "Domain added");
        self.find_domain(id, domain_id)
            .await?
            .ok_or_else(|| ApplicationError::Internal(format!("domain {domain_id} vanished after insert")))
    }

    #[instrument(skip(self))]
    async fn set_domain_verification(
        &self,
        id: TenantId,
        domain_id: DomainId,
        status: VerificationStatus,
    ) -> Result<Option<TenantDomain>, ApplicationError> {
        let result = sqlx::query(
            "UPDATE tenant_domains SET verification_status = $1 WHERE id = $2 AND tenant_id = $3",
        )
        .bind(status.as_str())
        .bind(domain_id.as_i64())
        .bind(id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_domain(id, domain_id).await
    }

    async fn ping(&self) -> Result<(), ApplicationError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

/// Row type for tenant queries
#[derive(sqlx::FromRow)]
struct TenantRow {
    id: i64,
    code: String,
    name: String,
    status: String,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    address: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TenantRow {
    fn into_tenant(self, domains: Vec<DomainRow>) -> Result<Tenant, ApplicationError> {
        Ok(Tenant {
            id: TenantId::new(self.id),
            code: TenantCode::parse(&self.code).map_err(corrupt)?,
            name: self.name,
            status: self.status.parse().map_err(corrupt)?,
            contact: TenantContact {
                email: self.contact_email,
                phone: self.contact_phone,
                address: self.address,
            },
            domains: domains
                .into_iter()
                .map(DomainRow::into_domain)
                .collect::<Result<_, _>>()?,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

/// Row type for domain queries
#[derive(sqlx::FromRow)]
struct DomainRow {
    id: i64,
    hostname: String,
    is_primary: bool,
    verification_status: String,
    created_at: String,
}

impl DomainRow {
    fn into_domain(self) -> Result<TenantDomain, ApplicationError> {
        Ok(TenantDomain {
            id: DomainId::new(self.id),
            hostname: Hostname::parse(&self.hostname).map_err(corrupt)?,
            is_primary: self.is_primary,
            verification_status: self.verification_status.parse().map_err(corrupt)?,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn corrupt(e: domain::DomainError) -> ApplicationError {
    ApplicationError::Internal(format!("Invalid value in database: {e}"))
}

/// Parse an RFC3339 datetime string
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, ApplicationError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApplicationError::Internal(format!("Invalid datetime: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{Schema, SqliteDatabase};

    async fn directory() -> SqliteTenantDirectory {
        let db = SqliteDatabase::in_memory().await.unwrap();
        db.migrate(Schema::Platform).await.unwrap();
        SqliteTenantDirectory::new(db.into_pool())
    }

    fn new_tenant(code: &str) -> NewTenant {
        NewTenant::new(TenantCode::parse(code).unwrap(), format!("{code} clinic"))
    }

    fn host(s: &str) -> Hostname {
        Hostname::parse(s).unwrap()
    }

    #[tokio::test]
    async fn create_and_find_by_code() {
        let dir = directory().await;
        let created = dir.create(&new_tenant("acme")).await.unwrap();
        assert_eq!(created.status, TenantStatus::Active);

        let found = dir
            .find_by_code(&TenantCode::parse("acme").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert!(found.domains.is_empty());
    }

    #[tokio::test]
    async fn duplicate_code_is_rejected() {
        let dir = directory().await;
        dir.create(&new_tenant("acme")).await.unwrap();
        let err = dir.create(&new_tenant("acme")).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_lookups_return_none() {
        let dir = directory().await;
        assert!(dir.find_by_id(TenantId::new(99)).await.unwrap().is_none());
        assert!(dir.find_by_hostname(&host("nobody.test")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn first_domain_becomes_primary() {
        let dir = directory().await;
        let tenant = dir.create(&new_tenant("acme")).await.unwrap();

        let first = dir.add_domain(tenant.id, &host("acme.example.com"), false).await.unwrap();
        let second = dir.add_domain(tenant.id, &host("acme.org"), false).await.unwrap();

        assert!(first.is_primary);
        assert!(!second.is_primary);
        assert_eq!(second.verification_status, VerificationStatus::Pending);
    }

    #[tokio::test]
    async fn switching_primary_demotes_previous() {
        let dir = directory().await;
        let tenant = dir.create(&new_tenant("acme")).await.unwrap();
        dir.add_domain(tenant.id, &host("acme.example.com"), false).await.unwrap();
        let new_primary = dir.add_domain(tenant.id, &host("acme.org"), true).await.unwrap();

        let reloaded = dir.find_by_id(tenant.id).await.unwrap().unwrap();
        assert!(reloaded.has_consistent_primary());
        assert_eq!(reloaded.primary_domain().unwrap().id, new_primary.id);
    }

    #[tokio::test]
    async fn hostname_is_globally_unique() {
        let dir = directory().await;
        let a = dir.create(&new_tenant("acme")).await.unwrap();
        let b = dir.create(&new_tenant("beta")).await.unwrap();
        dir.add_domain(a.id, &host("shared.example.com"), false).await.unwrap();

        let err = dir
            .add_domain(b.id, &host("shared.example.com"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Validation(_)));
    }

    #[tokio::test]
    async fn add_domain_to_unknown_tenant_is_not_found() {
        let dir = directory().await;
        let err = dir
            .add_domain(TenantId::new(42), &host("ghost.test"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn find_by_hostname_returns_owner_with_domains() {
        let dir = directory().await;
        let tenant = dir.create(&new_tenant("acme")).await.unwrap();
        dir.add_domain(tenant.id, &host("acme.example.com"), false).await.unwrap();
        dir.add_domain(tenant.id, &host("acme.org"), false).await.unwrap();

        let found = dir.find_by_hostname(&host("acme.org")).await.unwrap().unwrap();
        assert_eq!(found.id, tenant.id);
        assert_eq!(found.domains.len(), 2);
    }

    #[tokio::test]
    async fn verification_is_scoped_to_tenant() {
        let dir = directory().await;
        let a = dir.create(&new_tenant("acme")).await.unwrap();
        let b = dir.create(&new_tenant("beta")).await.unwrap();
        let domain = dir.add_domain(a.id, &host("acme.org"), false).await.unwrap();

        let other = dir
            .set_domain_verification(b.id, domain.id, VerificationStatus::Verified)
            .await
            .unwrap();
        assert!(other.is_none());

        let verified = dir
            .set_domain_verification(a.id, domain.id, VerificationStatus::Verified)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(verified.verification_status, VerificationStatus::Verified);
    }

    #[tokio::test]
    async fn update_and_status_change() {
        let dir = directory().await;
        let tenant = dir.create(&new_tenant("acme")).await.unwrap();

        let update = TenantUpdate {
            name: Some("Acme Health".to_string()),
            contact_phone: Some("+1 555 0100".to_string()),
            ..Default::default()
        };
        let updated = dir.update(tenant.id, &update).await.unwrap().unwrap();
        assert_eq!(updated.name, "Acme Health");
        assert_eq!(updated.contact.phone.as_deref(), Some("+1 555 0100"));

        let suspended = dir
            .set_status(tenant.id, TenantStatus::Active, TenantStatus::Suspended)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(suspended.status, TenantStatus::Suspended);

        assert!(dir
            .set_status(TenantId::new(999), TenantStatus::Active, TenantStatus::Deleted)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn stale_status_write_is_a_conflict() {
        let dir = directory().await;
        let tenant = dir.create(&new_tenant("acme")).await.unwrap();
        dir.set_status(tenant.id, TenantStatus::Active, TenantStatus::Suspended)
            .await
            .unwrap();
        dir.set_status(tenant.id, TenantStatus::Suspended, TenantStatus::Deleted)
            .await
            .unwrap();

        let err = dir
            .set_status(tenant.id, TenantStatus::Suspended, TenantStatus::Active)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Conflict(_)));

        let stored = dir.find_by_id(tenant.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TenantStatus::Deleted);
    }

    #[tokio::test]
    async fn ping_succeeds() {
        directory().await.ping().await.unwrap();
    }
}
