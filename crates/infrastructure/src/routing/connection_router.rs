//! Connection router - tenant id to isolated data-access handle
//!
//! Handles are cached per tenant in a moka cache. On a miss, exactly one
//! construction runs per tenant key and every concurrent caller awaits its
//! result. Failed constructions are never cached.
//!
//! Each cached entry records the tenant status it was built against and
//! the tenant's eviction generation. [`ConnectionRouter::evict`] bumps the
//! generation before removing the entry, so a construction that was in
//! flight during an eviction is discarded instead of served.

use std::{
    collections::HashMap,
    fmt,
    sync::Arc,
    time::Duration,
};

use application::{
    error::ApplicationError,
    ports::{AccessIntent, TenantConnectionPort, TenantDirectoryPort},
};
use async_trait::async_trait;
use domain::{ResolvedTenant, TenantId, TenantStatus};
use moka::{future::Cache, notification::RemovalCause};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::config::TenancyConfig;

/// Attempts before giving up when evictions keep racing a construction
const MAX_ATTEMPTS: usize = 3;

/// Opens and closes the storage handle of one tenant
#[async_trait]
pub trait HandleFactory: Send + Sync + 'static {
    /// Cheaply cloneable handle, e.g. a connection pool
    type Handle: Clone + Send + Sync + 'static;

    /// Open a handle to the tenant's store
    async fn open(&self, tenant: &ResolvedTenant) -> Result<Self::Handle, ApplicationError>;

    /// Release a handle's resources
    async fn close(&self, handle: Self::Handle);
}

/// Router tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Upper bound for one handle construction
    pub connect_timeout: Duration,
    /// Cached handles unused for this long are evicted and closed
    pub idle_timeout: Option<Duration>,
    /// Upper bound on cached handles; handles evicted over capacity are
    /// released once their last clone drops
    pub max_handles: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::from(&TenancyConfig::default())
    }
}

impl From<&TenancyConfig> for RouterConfig {
    fn from(config: &TenancyConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            idle_timeout: (config.handle_idle_secs > 0).then(|| config.handle_idle()),
            max_handles: config.max_cached_handles,
        }
    }
}

#[derive(Clone)]
struct CachedHandle<H> {
    handle: H,
    code: String,
    status: TenantStatus,
    generation: u64,
}

/// Per-tenant handle cache with single-flight construction
pub struct ConnectionRouter<F: HandleFactory> {
    directory: Arc<dyn TenantDirectoryPort>,
    factory: Arc<F>,
    cache: Cache<TenantId, CachedHandle<F::Handle>>,
    generations: RwLock<HashMap<TenantId, u64>>,
    config: RouterConfig,
}

impl<F: HandleFactory> fmt::Debug for ConnectionRouter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRouter")
            .field("cached_handles", &self.cache.entry_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<F: HandleFactory> ConnectionRouter<F> {
    pub fn new(directory: Arc<dyn TenantDirectoryPort>, factory: F, config: RouterConfig) -> Self {
        let factory = Arc::new(factory);
        let listener_factory = Arc::clone(&factory);

        let mut builder = Cache::builder()
            .max_capacity(config.max_handles)
            .async_eviction_listener(
                move |tenant: Arc<TenantId>, entry: CachedHandle<F::Handle>, cause: RemovalCause| {
                    let factory = Arc::clone(&listener_factory);
                    Box::pin(async move {
                        // Explicit removals are closed by whoever removed them. Size
                        // evictions may hit a handle a caller still holds (or one just
                        // rejected on admission), so those are dropped, not closed.
                        if cause == RemovalCause::Expired {
                            debug!(tenant = %tenant, "Closing idle tenant handle");
                            factory.close(entry.handle).await;
                        } else if cause == RemovalCause::Size {
                            debug!(tenant = %tenant, "Dropping tenant handle over capacity");
                        }
                    }) as moka::notification::ListenerFuture
                },
            );
        if let Some(idle) = config.idle_timeout {
            builder = builder.time_to_idle(idle);
        }

        Self {
            directory,
            factory,
            cache: builder.build(),
            generations: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Get the handle of a tenant for the stated intent
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::TenantNotFound`] if the tenant does not exist
    /// - [`ApplicationError::TenantInactive`] for writes to suspended or
    ///   deleted tenants and for any access to deleted tenants
    /// - [`ApplicationError::TenantUnavailable`] if the handle cannot be
    ///   opened within the configured timeout
    #[instrument(skip(self), fields(tenant = %tenant, intent = %intent))]
    pub async fn get_handle(
        &self,
        tenant: TenantId,
        intent: AccessIntent,
    ) -> Result<F::Handle, ApplicationError> {
        for _ in 0..MAX_ATTEMPTS {
            let generation = self.generation(tenant);

            let entry = if let Some(entry) = self.cache.get(&tenant).await {
                entry
            } else {
                let snapshot = self.lookup(tenant).await?;
                admit(snapshot.code().as_str(), snapshot.status(), intent)?;
                self.cache
                    .try_get_with(tenant, self.construct(snapshot, generation))
                    .await
                    .map_err(unshare)?
            };

            if entry.generation != self.generation(tenant) {
                debug!("Discarding handle built before eviction");
                self.discard_stale(tenant, entry).await;
                continue;
            }

            admit(&entry.code, entry.status, intent)?;
            return Ok(entry.handle);
        }

        Err(ApplicationError::TenantUnavailable(format!(
            "tenant {tenant} handle invalidated repeatedly during construction"
        )))
    }

    /// Close and drop the cached handle of a tenant
    #[instrument(skip(self), fields(tenant = %tenant))]
    pub async fn evict(&self, tenant: TenantId) {
        *self.generations.write().entry(tenant).or_insert(0) += 1;

        if let Some(entry) = self.cache.remove(&tenant).await {
            self.factory.close(entry.handle).await;
            info!("Tenant handle evicted");
        }
    }

    /// Number of currently cached handles
    pub async fn cached_handles(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Close every cached handle
    pub async fn shutdown(&self) {
        let tenants: Vec<TenantId> = self.cache.iter().map(|(tenant, _)| *tenant).collect();
        for tenant in tenants {
            self.evict(tenant).await;
        }
    }

    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }

    fn generation(&self, tenant: TenantId) -> u64 {
        self.generations.read().get(&tenant).copied().unwrap_or(0)
    }

    async fn lookup(&self, tenant: TenantId) -> Result<ResolvedTenant, ApplicationError> {
        self.directory
            .find_by_id(tenant)
            .await?
            .map(|t| t.to_resolved())
            .ok_or_else(|| ApplicationError::TenantNotFound(format!("id {tenant}")))
    }

    async fn construct(
        &self,
        tenant: ResolvedTenant,
        generation: u64,
    ) -> Result<CachedHandle<F::Handle>, ApplicationError> {
        let timeout = self.config.connect_timeout;
        let handle = match tokio::time::timeout(timeout, self.factory.open(&tenant)).await {
            Ok(Ok(handle)) => handle,
            Ok(Err(e)) => {
                warn!(tenant = %tenant.code(), error = %e, "Failed to open tenant handle");
                return Err(ApplicationError::TenantUnavailable(format!(
                    "{}: {e}",
                    tenant.code()
                )));
            },
            Err(_) => {
                warn!(tenant = %tenant.code(), ?timeout, "Timed out opening tenant handle");
                return Err(ApplicationError::TenantUnavailable(format!(
                    "{}: timed out after {}ms",
                    tenant.code(),
                    timeout.as_millis()
                )));
            },
        };

        info!(tenant = %tenant.code(), status = %tenant.status(), "Tenant handle opened");
        Ok(CachedHandle {
            handle,
            code: tenant.code().to_string(),
            status: tenant.status(),
            generation,
        })
    }

    async fn discard_stale(&self, tenant: TenantId, stale: CachedHandle<F::Handle>) {
        let current = self.generation(tenant);
        if let Some(cached) = self.cache.get(&tenant).await {
            if cached.generation != current {
                self.cache.invalidate(&tenant).await;
            }
        }
        self.factory.close(stale.handle).await;
    }
}

#[async_trait]
impl<F: HandleFactory> TenantConnectionPort for ConnectionRouter<F> {
    async fn evict(&self, tenant: TenantId) {
        Self::evict(self, tenant).await;
    }
}

/// Whether a tenant status admits an intent
///
/// Active admits everything, suspended admits reads, deleted admits nothing.
fn admit(code: &str, status: TenantStatus, intent: AccessIntent) -> Result<(), ApplicationError> {
    match (status, intent) {
        (TenantStatus::Active, _) | (TenantStatus::Suspended, AccessIntent::Read) => Ok(()),
        _ => Err(ApplicationError::TenantInactive {
            code: code.to_string(),
            status,
        }),
    }
}

/// Recover an owned error from moka's shared init error
fn unshare(e: Arc<ApplicationError>) -> ApplicationError {
    Arc::try_unwrap(e).unwrap_or_else(|shared| match &*shared {
        ApplicationError::TenantUnavailable(msg) => ApplicationError::TenantUnavailable(msg.clone()),
        other => ApplicationError::Internal(other.to_string()),
    })
}
