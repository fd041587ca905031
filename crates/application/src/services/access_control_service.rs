//! Access control service - per-principal tab allow-lists
//!
//! Reads are default-open and degrade: when the grant store cannot be read,
//! the full catalog is returned instead of an error. Writes propagate every
//! failure. Tenant isolation failures are never masked, on either path.

use std::{fmt, sync::Arc};

use domain::{
    CapabilityDefinition, CapabilitySet, EnabledCapabilities, PrincipalId, PrincipalKind,
    ResolvedTenant, list_capabilities,
};
use tracing::{debug, info, instrument, warn};

use super::capability_strategy::{
    AccessSubject, CapabilityStrategy, CapabilityStrategyTable, EffectiveCapabilities,
};
use crate::{
    error::ApplicationError,
    ports::{AccessGrantStore, PatientAccountPort},
};

/// Service answering and mutating "which tabs may principal Y use"
pub struct AccessControlService {
    grants: Arc<dyn AccessGrantStore>,
    patients: Arc<dyn PatientAccountPort>,
    strategies: CapabilityStrategyTable,
}

impl fmt::Debug for AccessControlService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessControlService")
            .field("strategies", &self.strategies)
            .finish_non_exhaustive()
    }
}

impl AccessControlService {
    pub fn new(grants: Arc<dyn AccessGrantStore>, patients: Arc<dyn PatientAccountPort>) -> Self {
        Self {
            grants,
            patients,
            strategies: CapabilityStrategyTable::default(),
        }
    }

    #[must_use]
    pub fn with_strategies(mut self, strategies: CapabilityStrategyTable) -> Self {
        self.strategies = strategies;
        self
    }

    /// Ordered catalog for a principal kind
    pub fn catalog(&self, kind: PrincipalKind) -> &'static [CapabilityDefinition] {
        list_capabilities(kind)
    }

    /// Enabled tabs of a principal
    ///
    /// # Errors
    ///
    /// Only tenant isolation failures; storage failures degrade to the
    /// default set.
    #[instrument(skip(self, tenant), fields(tenant = %tenant.code(), kind = %kind, principal = %principal))]
    pub async fn get_enabled(
        &self,
        tenant: &ResolvedTenant,
        kind: PrincipalKind,
        principal: PrincipalId,
    ) -> Result<EnabledCapabilities, ApplicationError> {
        match self.grants.get(tenant.id(), kind, principal).await {
            Ok(Some(grant)) => Ok(EnabledCapabilities::stored(grant.capabilities)),
            Ok(None) => {
                debug!("No grant stored, default applies");
                Ok(EnabledCapabilities::default_for(kind))
            },
            Err(e) if e.is_isolation_failure() => Err(e),
            Err(e) => {
                warn!(error = %e, "Grant store unreadable, serving default tabs");
                Ok(EnabledCapabilities::default_for(kind))
            },
        }
    }

    /// Replace the enabled tabs of a principal
    ///
    /// Returns the normalized set as stored.
    ///
    /// # Errors
    ///
    /// [`ApplicationError::Validation`] for ids outside the catalog; every
    /// storage or isolation failure propagates.
    #[instrument(skip(self, tenant, requested), fields(tenant = %tenant.code(), kind = %kind, principal = %principal))]
    pub async fn set_enabled(
        &self,
        tenant: &ResolvedTenant,
        kind: PrincipalKind,
        principal: PrincipalId,
        requested: &[String],
    ) -> Result<CapabilitySet, ApplicationError> {
        let normalized = CapabilitySet::from_requested(kind, requested)
            .map_err(|e| ApplicationError::Validation(e.to_string()))?;

        let grant = self
            .grants
            .upsert(tenant.id(), kind, principal, &normalized)
            .await?;

        info!(tabs = grant.capabilities.len(), "Access grant replaced");
        Ok(grant.capabilities)
    }

    /// Capabilities effective for a subject, per the role strategy table
    #[instrument(skip(self, tenant), fields(tenant = %tenant.code(), role = %subject.role))]
    pub async fn effective_capabilities(
        &self,
        tenant: &ResolvedTenant,
        subject: &AccessSubject,
    ) -> Result<EffectiveCapabilities, ApplicationError> {
        match self.strategies.strategy_for(subject.role)? {
            CapabilityStrategy::AllCapabilities => Ok(EffectiveCapabilities::All),
            CapabilityStrategy::Grants(kind) => {
                let principal = subject.principal.ok_or_else(|| {
                    ApplicationError::Validation(format!(
                        "role '{}' requires a principal id",
                        subject.role
                    ))
                })?;
                let enabled = self.get_enabled(tenant, kind, principal).await?;
                Ok(EffectiveCapabilities::Enabled(enabled))
            },
        }
    }

    /// Whether a subject may use a capability
    pub async fn has_capability(
        &self,
        tenant: &ResolvedTenant,
        subject: &AccessSubject,
        capability: &str,
    ) -> Result<bool, ApplicationError> {
        Ok(self
            .effective_capabilities(tenant, subject)
            .await?
            .allows(capability))
    }

    /// Portal access flag of a patient
    ///
    /// # Errors
    ///
    /// [`ApplicationError::NotFound`] if the patient is unknown.
    #[instrument(skip(self, tenant), fields(tenant = %tenant.code(), patient = %patient))]
    pub async fn patient_access(
        &self,
        tenant: &ResolvedTenant,
        patient: PrincipalId,
    ) -> Result<bool, ApplicationError> {
        self.patients
            .is_active(tenant.id(), patient)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("patient {patient}")))
    }

    /// Enable or disable portal access of a patient
    ///
    /// # Errors
    ///
    /// [`ApplicationError::NotFound`] if the patient is unknown.
    #[instrument(skip(self, tenant), fields(tenant = %tenant.code(), patient = %patient))]
    pub async fn set_patient_access(
        &self,
        tenant: &ResolvedTenant,
        patient: PrincipalId,
        is_active: bool,
    ) -> Result<bool, ApplicationError> {
        if self.patients.set_active(tenant.id(), patient, is_active).await? {
            info!(is_active, "Patient portal access changed");
            Ok(is_active)
        } else {
            Err(ApplicationError::NotFound(format!("patient {patient}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use domain::{AccessGrant, TenantCode, TenantId, TenantStatus};

    use super::*;
    use crate::services::capability_strategy::Role;
    use crate::ports::{MockAccessGrantStore, MockPatientAccountPort};

    fn acme() -> ResolvedTenant {
        ResolvedTenant::new(
            TenantId::new(1),
            TenantCode::parse("acme").unwrap(),
            TenantStatus::Active,
            "Acme Clinic",
        )
    }

    fn grant(kind: PrincipalKind, principal: PrincipalId, caps: &CapabilitySet) -> AccessGrant {
        AccessGrant {
            principal_kind: kind,
            principal_id: principal,
            capabilities: caps.clone(),
            updated_at: Utc::now(),
        }
    }

    fn service(grants: MockAccessGrantStore) -> AccessControlService {
        AccessControlService::new(Arc::new(grants), Arc::new(MockPatientAccountPort::new()))
    }

    fn tabs(ids: &[&str]) -> Vec<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    /// In-memory grant store used to exercise write-then-read sequences
    #[derive(Default)]
    struct MemoryGrants {
        grants: Mutex<Vec<AccessGrant>>,
    }

    #[async_trait::async_trait]
    impl AccessGrantStore for MemoryGrants {
        async fn get(
            &self,
            _tenant: TenantId,
            kind: PrincipalKind,
            principal: PrincipalId,
        ) -> Result<Option<AccessGrant>, ApplicationError> {
            let grants = self.grants.lock().unwrap();
            Ok(grants
                .iter()
                .find(|g| g.principal_kind == kind && g.principal_id == principal)
                .cloned())
        }

        async fn upsert(
            &self,
            _tenant: TenantId,
            kind: PrincipalKind,
            principal: PrincipalId,
            capabilities: &CapabilitySet,
        ) -> Result<AccessGrant, ApplicationError> {
            let mut grants = self.grants.lock().unwrap();
            grants.retain(|g| !(g.principal_kind == kind && g.principal_id == principal));
            let stored = grant(kind, principal, capabilities);
            grants.push(stored.clone());
            Ok(stored)
        }
    }

    #[tokio::test]
    async fn absent_grant_yields_full_default() {
        let mut grants = MockAccessGrantStore::new();
        grants.expect_get().returning(|_, _, _| Ok(None));

        let enabled = service(grants)
            .get_enabled(&acme(), PrincipalKind::Doctor, PrincipalId::new(42))
            .await
            .unwrap();

        assert!(enabled.is_default());
        assert_eq!(enabled.tabs().len(), 24);
        assert!(enabled.contains("dashboard"));
    }

    #[tokio::test]
    async fn stored_grant_is_returned_tagged() {
        let mut grants = MockAccessGrantStore::new();
        grants.expect_get().returning(|_, kind, principal| {
            let caps = CapabilitySet::from_requested(kind, ["billing"]).unwrap();
            Ok(Some(grant(kind, principal, &caps)))
        });

        let enabled = service(grants)
            .get_enabled(&acme(), PrincipalKind::Patient, PrincipalId::new(7))
            .await
            .unwrap();

        assert!(!enabled.is_default());
        assert_eq!(enabled.tabs(), tabs(&["dashboard", "billing"]));
    }

    #[tokio::test]
    async fn storage_failure_degrades_to_default() {
        let mut grants = MockAccessGrantStore::new();
        grants
            .expect_get()
            .returning(|_, _, _| Err(ApplicationError::TenantUnavailable("unreachable".into())));

        let enabled = service(grants)
            .get_enabled(&acme(), PrincipalKind::Patient, PrincipalId::new(7))
            .await
            .unwrap();

        assert!(enabled.is_default());
        assert_eq!(enabled.tabs().len(), 13);
    }

    #[tokio::test]
    async fn isolation_failure_is_not_masked() {
        let mut grants = MockAccessGrantStore::new();
        grants.expect_get().returning(|_, _, _| {
            Err(ApplicationError::TenantInactive {
                code: "acme".into(),
                status: TenantStatus::Deleted,
            })
        });

        let err = service(grants)
            .get_enabled(&acme(), PrincipalKind::Doctor, PrincipalId::new(1))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::TenantInactive { .. }));
    }

    #[tokio::test]
    async fn set_enabled_rejects_unknown_ids_before_storage() {
        let mut grants = MockAccessGrantStore::new();
        grants.expect_upsert().never();

        let err = service(grants)
            .set_enabled(
                &acme(),
                PrincipalKind::Patient,
                PrincipalId::new(7),
                &tabs(&["staff"]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::Validation(_)));
    }

    #[tokio::test]
    async fn set_enabled_propagates_storage_failure() {
        let mut grants = MockAccessGrantStore::new();
        grants
            .expect_upsert()
            .returning(|_, _, _, _| Err(ApplicationError::Persistence("database is locked".into())));

        let err = service(grants)
            .set_enabled(
                &acme(),
                PrincipalKind::Doctor,
                PrincipalId::new(42),
                &tabs(&["appointments"]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::Persistence(_)));
    }

    #[tokio::test]
    async fn doctor_42_default_then_customized() {
        let service = AccessControlService::new(
            Arc::new(MemoryGrants::default()),
            Arc::new(MockPatientAccountPort::new()),
        );
        let tenant = acme();
        let doctor = PrincipalId::new(42);

        let before = service
            .get_enabled(&tenant, PrincipalKind::Doctor, doctor)
            .await
            .unwrap();
        assert_eq!(before.tabs().len(), 24);

        let stored = service
            .set_enabled(&tenant, PrincipalKind::Doctor, doctor, &tabs(&["appointments"]))
            .await
            .unwrap();
        assert_eq!(stored.as_slice(), tabs(&["dashboard", "appointments"]));

        let after = service
            .get_enabled(&tenant, PrincipalKind::Doctor, doctor)
            .await
            .unwrap();
        assert!(!after.is_default());
        assert_eq!(after.tabs(), tabs(&["dashboard", "appointments"]));
    }

    #[tokio::test]
    async fn set_enabled_is_idempotent() {
        let service = AccessControlService::new(
            Arc::new(MemoryGrants::default()),
            Arc::new(MockPatientAccountPort::new()),
        );
        let requested = tabs(&["profile", "billing", "billing"]);

        let first = service
            .set_enabled(&acme(), PrincipalKind::Patient, PrincipalId::new(3), &requested)
            .await
            .unwrap();
        let second = service
            .set_enabled(&acme(), PrincipalKind::Patient, PrincipalId::new(3), &requested)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.as_slice(), tabs(&["dashboard", "billing", "profile"]));
    }

    #[tokio::test]
    async fn admin_has_every_capability_without_store_access() {
        let mut grants = MockAccessGrantStore::new();
        grants.expect_get().never();

        let allowed = service(grants)
            .has_capability(&acme(), &AccessSubject::admin(), "audit_log")
            .await
            .unwrap();
        assert!(allowed);
    }

    #[tokio::test]
    async fn doctor_capability_follows_grant() {
        let mut grants = MockAccessGrantStore::new();
        grants.expect_get().returning(|_, kind, principal| {
            let caps = CapabilitySet::from_requested(kind, ["appointments"]).unwrap();
            Ok(Some(grant(kind, principal, &caps)))
        });
        let service = service(grants);
        let subject = AccessSubject::doctor(PrincipalId::new(42));

        assert!(service.has_capability(&acme(), &subject, "appointments").await.unwrap());
        assert!(!service.has_capability(&acme(), &subject, "billing").await.unwrap());
    }

    #[tokio::test]
    async fn grant_role_without_principal_is_rejected() {
        let err = service(MockAccessGrantStore::new())
            .has_capability(&acme(), &AccessSubject::new(Role::Patient, None), "billing")
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_patient_access_is_not_found() {
        let mut patients = MockPatientAccountPort::new();
        patients.expect_is_active().returning(|_, _| Ok(None));
        patients.expect_set_active().returning(|_, _, _| Ok(false));
        let service = AccessControlService::new(Arc::new(MockAccessGrantStore::new()), Arc::new(patients));

        let err = service
            .patient_access(&acme(), PrincipalId::new(99))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));

        let err = service
            .set_patient_access(&acme(), PrincipalId::new(99), false)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn patient_access_roundtrip() {
        let mut patients = MockPatientAccountPort::new();
        patients.expect_is_active().returning(|_, _| Ok(Some(true)));
        patients
            .expect_set_active()
            .withf(|_, id, active| id.as_i64() == 7 && !*active)
            .returning(|_, _, _| Ok(true));
        let service = AccessControlService::new(Arc::new(MockAccessGrantStore::new()), Arc::new(patients));

        assert!(service.patient_access(&acme(), PrincipalId::new(7)).await.unwrap());
        assert!(!service
            .set_patient_access(&acme(), PrincipalId::new(7), false)
            .await
            .unwrap());
    }

    #[test]
    fn catalog_is_exposed_in_order() {
        let service = service(MockAccessGrantStore::new());
        let catalog = service.catalog(PrincipalKind::Patient);
        assert_eq!(catalog.len(), 13);
        assert_eq!(catalog[0].id, "dashboard");
    }
}
