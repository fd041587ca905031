//! Tenant resolver - maps an inbound request to exactly one tenant
//!
//! Resolution order, first match wins:
//!
//! 1. development override code (only when enabled)
//! 2. explicit tenant code (header or query parameter)
//! 3. exact hostname match against the directory's domain index
//! 4. subdomain of the configured base domain, used as a tenant code
//!
//! An explicit code that matches nothing is a miss; it never falls through
//! to the hostname. Suspended and deleted tenants still resolve; callers
//! decide what a status allows.

use std::{fmt, sync::Arc};

use domain::{Hostname, ResolvedTenant, Tenant, TenantCode};
use tracing::{debug, instrument};

use crate::{error::ApplicationError, ports::TenantDirectoryPort, request_context::RequestContext};

/// Resolver behavior switches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Base domain for subdomain fallback, e.g. `example.com`
    pub base_domain: Option<String>,
    /// Whether the development override signal is honored
    pub dev_override_enabled: bool,
}

impl ResolverConfig {
    #[must_use]
    pub fn with_base_domain(mut self, base_domain: impl Into<String>) -> Self {
        let base = base_domain.into().trim().trim_end_matches('.').to_lowercase();
        self.base_domain = (!base.is_empty()).then_some(base);
        self
    }

    #[must_use]
    pub const fn with_dev_override(mut self, enabled: bool) -> Self {
        self.dev_override_enabled = enabled;
        self
    }
}

/// Service resolving request context to a tenant
pub struct TenantResolver {
    directory: Arc<dyn TenantDirectoryPort>,
    config: ResolverConfig,
}

impl fmt::Debug for TenantResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TenantResolver {
    pub fn new(directory: Arc<dyn TenantDirectoryPort>) -> Self {
        Self {
            directory,
            config: ResolverConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve the tenant a request belongs to
    ///
    /// # Errors
    ///
    /// [`ApplicationError::TenantNotFound`] when no signal matches;
    /// directory failures propagate unchanged.
    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id()))]
    pub async fn resolve(&self, ctx: &RequestContext) -> Result<ResolvedTenant, ApplicationError> {
        if let Some(code) = ctx.dev_override() {
            if self.config.dev_override_enabled {
                debug!(code, "Resolving tenant from development override");
                return self.resolve_code(code).await;
            }
            debug!("Ignoring development override, not enabled");
        }

        if let Some(code) = ctx.explicit_code() {
            debug!(code, "Resolving tenant from explicit code");
            return self.resolve_code(code).await;
        }

        if let Some(raw) = ctx.hostname() {
            return self.resolve_hostname(raw).await;
        }

        Err(ApplicationError::TenantNotFound(
            "request carries no tenant signal".to_string(),
        ))
    }

    async fn resolve_code(&self, raw: &str) -> Result<ResolvedTenant, ApplicationError> {
        let code = TenantCode::parse(raw)
            .map_err(|_| ApplicationError::TenantNotFound(format!("code '{raw}'")))?;

        self.directory
            .find_by_code(&code)
            .await?
            .map(|tenant| tenant.to_resolved())
            .ok_or_else(|| ApplicationError::TenantNotFound(format!("code '{code}'")))
    }

    async fn resolve_hostname(&self, raw: &str) -> Result<ResolvedTenant, ApplicationError> {
        let hostname = Hostname::parse(raw)
            .map_err(|_| ApplicationError::TenantNotFound(format!("host '{raw}'")))?;

        if let Some(tenant) = self.directory.find_by_hostname(&hostname).await? {
            if routes_hostname(&tenant, &hostname) {
                debug!(host = %hostname, tenant = %tenant.code, "Resolved tenant by hostname");
                return Ok(tenant.to_resolved());
            }
            debug!(host = %hostname, tenant = %tenant.code, "Hostname registered but not verified");
        }

        if let Some(code) = self.subdomain_code(&hostname) {
            if let Some(tenant) = self.directory.find_by_code(&code).await? {
                debug!(host = %hostname, tenant = %tenant.code, "Resolved tenant by subdomain");
                return Ok(tenant.to_resolved());
            }
        }

        Err(ApplicationError::TenantNotFound(format!("host '{hostname}'")))
    }

    fn subdomain_code(&self, hostname: &Hostname) -> Option<TenantCode> {
        let base = self.config.base_domain.as_deref()?;
        let label = hostname.subdomain_of(base)?;
        TenantCode::parse(label).ok()
    }
}

fn routes_hostname(tenant: &Tenant, hostname: &Hostname) -> bool {
    tenant
        .domains
        .iter()
        .any(|d| &d.hostname == hostname && d.routes_requests())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use domain::{
        DomainId, TenantContact, TenantDomain, TenantId, TenantStatus, VerificationStatus,
    };
    use mockall::predicate::eq;

    use super::*;
    use crate::ports::MockTenantDirectoryPort;

    fn tenant(code: &str, status: TenantStatus, domains: &[(&str, bool, VerificationStatus)]) -> Tenant {
        Tenant {
            id: TenantId::new(7),
            code: TenantCode::parse(code).unwrap(),
            name: format!("{code} clinic"),
            status,
            contact: TenantContact::default(),
            domains: domains
                .iter()
                .enumerate()
                .map(|(i, (host, primary, verification))| TenantDomain {
                    id: DomainId::new(i as i64 + 1),
                    hostname: Hostname::parse(host).unwrap(),
                    is_primary: *primary,
                    verification_status: *verification,
                    created_at: Utc::now(),
                })
                .collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn acme() -> Tenant {
        tenant(
            "acme",
            TenantStatus::Active,
            &[
                ("acme.example.com", true, VerificationStatus::Pending),
                ("acme.org", false, VerificationStatus::Verified),
                ("acme.net", false, VerificationStatus::Pending),
            ],
        )
    }

    #[tokio::test]
    async fn resolves_primary_hostname() {
        let mut directory = MockTenantDirectoryPort::new();
        directory
            .expect_find_by_hostname()
            .withf(|h| h.as_str() == "acme.example.com")
            .returning(|_| Ok(Some(acme())));

        let resolver = TenantResolver::new(Arc::new(directory));
        let ctx = RequestContext::new().with_hostname("ACME.example.com:8443");
        let resolved = resolver.resolve(&ctx).await.unwrap();

        assert_eq!(resolved.code().as_str(), "acme");
        assert_eq!(resolved.status(), TenantStatus::Active);
    }

    #[tokio::test]
    async fn resolves_verified_alternate() {
        let mut directory = MockTenantDirectoryPort::new();
        directory
            .expect_find_by_hostname()
            .returning(|_| Ok(Some(acme())));

        let resolver = TenantResolver::new(Arc::new(directory));
        let ctx = RequestContext::new().with_hostname("acme.org");
        assert!(resolver.resolve(&ctx).await.is_ok());
    }

    #[tokio::test]
    async fn unverified_alternate_is_not_found() {
        let mut directory = MockTenantDirectoryPort::new();
        directory
            .expect_find_by_hostname()
            .returning(|_| Ok(Some(acme())));

        let resolver = TenantResolver::new(Arc::new(directory));
        let ctx = RequestContext::new().with_hostname("acme.net");
        let err = resolver.resolve(&ctx).await.unwrap_err();
        assert!(matches!(err, ApplicationError::TenantNotFound(_)));
    }

    #[tokio::test]
    async fn unknown_hostname_is_not_found() {
        let mut directory = MockTenantDirectoryPort::new();
        directory.expect_find_by_hostname().returning(|_| Ok(None));

        let resolver = TenantResolver::new(Arc::new(directory));
        let ctx = RequestContext::new().with_hostname("nobody.example.org");
        let err = resolver.resolve(&ctx).await.unwrap_err();
        assert!(matches!(err, ApplicationError::TenantNotFound(_)));
    }

    #[tokio::test]
    async fn explicit_code_beats_hostname() {
        let mut directory = MockTenantDirectoryPort::new();
        directory
            .expect_find_by_code()
            .with(eq(TenantCode::parse("beta").unwrap()))
            .returning(|_| Ok(Some(tenant("beta", TenantStatus::Active, &[]))));
        directory.expect_find_by_hostname().never();

        let resolver = TenantResolver::new(Arc::new(directory));
        let ctx = RequestContext::new()
            .with_hostname("acme.example.com")
            .with_explicit_code("beta");
        let resolved = resolver.resolve(&ctx).await.unwrap();
        assert_eq!(resolved.code().as_str(), "beta");
    }

    #[tokio::test]
    async fn unknown_explicit_code_does_not_fall_back() {
        let mut directory = MockTenantDirectoryPort::new();
        directory.expect_find_by_code().returning(|_| Ok(None));
        directory.expect_find_by_hostname().never();

        let resolver = TenantResolver::new(Arc::new(directory));
        let ctx = RequestContext::new()
            .with_hostname("acme.example.com")
            .with_explicit_code("ghost");
        let err = resolver.resolve(&ctx).await.unwrap_err();
        assert!(matches!(err, ApplicationError::TenantNotFound(_)));
    }

    #[tokio::test]
    async fn malformed_code_is_not_found() {
        let directory = MockTenantDirectoryPort::new();
        let resolver = TenantResolver::new(Arc::new(directory));
        let ctx = RequestContext::new().with_explicit_code("Not A Code!");
        let err = resolver.resolve(&ctx).await.unwrap_err();
        assert!(matches!(err, ApplicationError::TenantNotFound(_)));
    }

    #[tokio::test]
    async fn suspended_tenant_still_resolves() {
        let mut directory = MockTenantDirectoryPort::new();
        directory.expect_find_by_code().returning(|_| {
            Ok(Some(tenant("acme", TenantStatus::Suspended, &[])))
        });

        let resolver = TenantResolver::new(Arc::new(directory));
        let ctx = RequestContext::new().with_explicit_code("acme");
        let resolved = resolver.resolve(&ctx).await.unwrap();
        assert_eq!(resolved.status(), TenantStatus::Suspended);
    }

    #[tokio::test]
    async fn dev_override_ignored_unless_enabled() {
        let mut directory = MockTenantDirectoryPort::new();
        directory
            .expect_find_by_code()
            .with(eq(TenantCode::parse("acme").unwrap()))
            .returning(|_| Ok(Some(acme())));

        let resolver = TenantResolver::new(Arc::new(directory));
        let ctx = RequestContext::new()
            .with_dev_override("devclinic")
            .with_explicit_code("acme");
        let resolved = resolver.resolve(&ctx).await.unwrap();
        assert_eq!(resolved.code().as_str(), "acme");
    }

    #[tokio::test]
    async fn dev_override_wins_when_enabled() {
        let mut directory = MockTenantDirectoryPort::new();
        directory
            .expect_find_by_code()
            .with(eq(TenantCode::parse("devclinic").unwrap()))
            .returning(|_| Ok(Some(tenant("devclinic", TenantStatus::Active, &[]))));

        let resolver = TenantResolver::new(Arc::new(directory))
            .with_config(ResolverConfig::default().with_dev_override(true));
        let ctx = RequestContext::new()
            .with_dev_override("devclinic")
            .with_explicit_code("acme");
        let resolved = resolver.resolve(&ctx).await.unwrap();
        assert_eq!(resolved.code().as_str(), "devclinic");
    }

    #[tokio::test]
    async fn subdomain_fallback_uses_label_as_code() {
        let mut directory = MockTenantDirectoryPort::new();
        directory.expect_find_by_hostname().returning(|_| Ok(None));
        directory
            .expect_find_by_code()
            .with(eq(TenantCode::parse("beta").unwrap()))
            .returning(|_| Ok(Some(tenant("beta", TenantStatus::Active, &[]))));

        let resolver = TenantResolver::new(Arc::new(directory))
            .with_config(ResolverConfig::default().with_base_domain("Example.com."));
        let ctx = RequestContext::new().with_hostname("beta.example.com");
        let resolved = resolver.resolve(&ctx).await.unwrap();
        assert_eq!(resolved.code().as_str(), "beta");
    }

    #[tokio::test]
    async fn no_signal_is_not_found() {
        let resolver = TenantResolver::new(Arc::new(MockTenantDirectoryPort::new()));
        let err = resolver.resolve(&RequestContext::new()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::TenantNotFound(_)));
    }

    #[tokio::test]
    async fn directory_failure_propagates() {
        let mut directory = MockTenantDirectoryPort::new();
        directory
            .expect_find_by_hostname()
            .returning(|_| Err(ApplicationError::Persistence("disk I/O error".into())));

        let resolver = TenantResolver::new(Arc::new(directory));
        let ctx = RequestContext::new().with_hostname("acme.example.com");
        let err = resolver.resolve(&ctx).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Persistence(_)));
    }
}
