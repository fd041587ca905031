//! SQLite patient accounts
//!
//! Only the portal access switch is modeled here; patient records are
//! owned by other parts of the platform.

use std::sync::Arc;

use application::{
    error::ApplicationError,
    ports::{AccessIntent, PatientAccountPort},
};
use async_trait::async_trait;
use chrono::Utc;
use domain::{PrincipalId, TenantId};
use tracing::{debug, instrument};

use super::error::map_sqlx_error;
use crate::routing::TenantRouter;

/// Patient portal access flags over per-tenant databases
#[derive(Debug, Clone)]
pub struct SqlitePatientAccounts {
    router: Arc<TenantRouter>,
}

impl SqlitePatientAccounts {
    #[must_use]
    pub const fn new(router: Arc<TenantRouter>) -> Self {
        Self { router }
    }

    /// Register a patient account, returning its id
    ///
    /// Used for seeding; patient onboarding proper lives elsewhere.
    #[instrument(skip(self, full_name))]
    pub async fn register(
        &self,
        tenant: TenantId,
        full_name: &str,
        is_active: bool,
    ) -> Result<PrincipalId, ApplicationError> {
        let pool = self.router.get_handle(tenant, AccessIntent::Write).await?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO patients (full_name, is_active, created_at, updated_at) VALUES ($1, $2, $3, $3)",
        )
        .bind(full_name)
        .bind(is_active)
        .bind(&now)
        .execute(&pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(PrincipalId::new(result.last_insert_rowid()))
    }
}

#[async_trait]
impl PatientAccountPort for SqlitePatientAccounts {
    #[instrument(skip(self), fields(tenant = %tenant, patient = %patient))]
    async fn is_active(
        &self,
        tenant: TenantId,
        patient: PrincipalId,
    ) -> Result<Option<bool>, ApplicationError> {
        let pool = self.router.get_handle(tenant, AccessIntent::Read).await?;

        sqlx::query_scalar::<_, bool>("SELECT is_active FROM patients WHERE id = $1")
            .bind(patient.as_i64())
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_error)
    }

    #[instrument(skip(self), fields(tenant = %tenant, patient = %patient))]
    async fn set_active(
        &self,
        tenant: TenantId,
        patient: PrincipalId,
        is_active: bool,
    ) -> Result<bool, ApplicationError> {
        let pool = self.router.get_handle(tenant, AccessIntent::Write).await?;

        let result = sqlx::query("UPDATE patients SET is_active = $1, updated_at = $2 WHERE id = $3")
            .bind(is_active)
            .bind(Utc::now().to_rfc3339())
            .bind(patient.as_i64())
            .execute(&pool)
            .await
            .map_err(map_sqlx_error)?;

        let found = result.rows_affected() > 0;
        debug!(found, is_active, "Patient access updated");
        Ok(found)
    }
}
