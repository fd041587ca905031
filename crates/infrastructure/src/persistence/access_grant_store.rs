//! SQLite access grant store
//!
//! Grants live in the tenant's own database: `doctor_tab_access` and
//! `patient_tab_access`, one row per principal with the enabled tab ids as
//! a JSON array. Reads go through the router with read intent, writes with
//! write intent.

use std::sync::Arc;

use application::{
    error::ApplicationError,
    ports::{AccessGrantStore, AccessIntent},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{AccessGrant, CapabilitySet, PrincipalId, PrincipalKind, TenantId};
use tracing::{debug, instrument};

use super::error::map_sqlx_error;
use crate::routing::TenantRouter;

/// Access grant store over per-tenant databases
#[derive(Debug, Clone)]
pub struct SqliteAccessGrantStore {
    router: Arc<TenantRouter>,
}

impl SqliteAccessGrantStore {
    #[must_use]
    pub const fn new(router: Arc<TenantRouter>) -> Self {
        Self { router }
    }
}

const fn table_for(kind: PrincipalKind) -> &'static str {
    match kind {
        PrincipalKind::Doctor => "doctor_tab_access",
        PrincipalKind::Patient => "patient_tab_access",
    }
}

#[async_trait]
impl AccessGrantStore for SqliteAccessGrantStore {
    #[instrument(skip(self), fields(tenant = %tenant, kind = %kind, principal = %principal))]
    async fn get(
        &self,
        tenant: TenantId,
        kind: PrincipalKind,
        principal: PrincipalId,
    ) -> Result<Option<AccessGrant>, ApplicationError> {
        let pool = self.router.get_handle(tenant, AccessIntent::Read).await?;

        let row: Option<GrantRow> = sqlx::query_as(&format!(
            "SELECT enabled_tabs, updated_at FROM {} WHERE principal_id = $1",
            table_for(kind)
        ))
        .bind(principal.as_i64())
        .fetch_optional(&pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            debug!("No grant stored");
            return Ok(None);
        };

        let stored: Vec<String> = serde_json::from_str(&row.enabled_tabs)
            .map_err(|e| ApplicationError::Persistence(format!("Corrupt enabled_tabs: {e}")))?;

        Ok(Some(AccessGrant {
            principal_kind: kind,
            principal_id: principal,
            capabilities: CapabilitySet::from_stored(kind, &stored),
            updated_at: DateTime::parse_from_rfc3339(&row.updated_at)
                .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc)),
        }))
    }

    #[instrument(skip(self, capabilities), fields(tenant = %tenant, kind = %kind, principal = %principal))]
    async fn upsert(
        &self,
        tenant: TenantId,
        kind: PrincipalKind,
        principal: PrincipalId,
        capabilities: &CapabilitySet,
    ) -> Result<AccessGrant, ApplicationError> {
        let pool = self.router.get_handle(tenant, AccessIntent::Write).await?;

        let tabs = serde_json::to_string(capabilities.as_slice())
            .map_err(|e| ApplicationError::Internal(format!("Failed to encode tabs: {e}")))?;
        let now = Utc::now();

        sqlx::query(&format!(
            r"
            INSERT INTO {} (principal_id, enabled_tabs, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT(principal_id) DO UPDATE SET
                enabled_tabs = excluded.enabled_tabs,
                updated_at = excluded.updated_at
            ",
            table_for(kind)
        ))
        .bind(principal.as_i64())
        .bind(&tabs)
        .bind(now.to_rfc3339())
        .execute(&pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(tabs = capabilities.len(), "Grant upserted");
        Ok(AccessGrant {
            principal_kind: kind,
            principal_id: principal,
            capabilities: capabilities.clone(),
            updated_at: now,
        })
    }
}

/// Row type for grant queries
#[derive(sqlx::FromRow)]
struct GrantRow {
    enabled_tabs: String,
    updated_at: String,
}
