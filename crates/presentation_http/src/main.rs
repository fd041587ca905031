//! HTTP server binary

use std::{sync::Arc, time::Duration};

use application::{
    AccessControlService, ResolverConfig, TenantAdminService, TenantResolver,
    ports::{AccessGrantStore, PatientAccountPort, TenantConnectionPort, TenantDirectoryPort},
};
use infrastructure::{
    AppConfig, DEFAULT_LOG_FILTER, Environment, RouterConfig, Schema,
    SqliteAccessGrantStore, SqliteDatabase, SqlitePatientAccounts,
    SqlitePoolFactory, SqliteTenantDirectory, TenantRouter, init_logging,
};
use presentation_http::{error::set_expose_internal_errors, routes, state::AppState};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_logging(config.server.log_format, DEFAULT_LOG_FILTER)?;
    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load configuration, using defaults");
    }

    info!(environment = %config.environment, "Starting CareGate server");
    set_expose_internal_errors(config.environment != Environment::Production);

    // Platform database (tenant directory)
    let platform = SqliteDatabase::new(&config.database.pool_config()).await?;
    if config.database.run_migrations {
        platform.migrate(Schema::Platform).await?;
    }
    let directory: Arc<dyn TenantDirectoryPort> =
        Arc::new(SqliteTenantDirectory::new(platform.pool().clone()));

    // Per-tenant connection routing
    let router = Arc::new(TenantRouter::new(
        Arc::clone(&directory),
        SqlitePoolFactory::from_config(&config.tenancy),
        RouterConfig::from(&config.tenancy),
    ));
    info!(
        data_dir = %config.tenancy.data_dir,
        idle_secs = config.tenancy.handle_idle_secs,
        "Tenant connection router ready"
    );

    let grants: Arc<dyn AccessGrantStore> =
        Arc::new(SqliteAccessGrantStore::new(Arc::clone(&router)));
    let patients: Arc<dyn PatientAccountPort> =
        Arc::new(SqlitePatientAccounts::new(Arc::clone(&router)));
    let connections: Arc<dyn TenantConnectionPort> = router.clone();

    let mut resolver_config = ResolverConfig::default().with_dev_override(config.dev_override_active());
    if let Some(base_domain) = &config.tenancy.base_domain {
        resolver_config = resolver_config.with_base_domain(base_domain.as_str());
    }
    if config.dev_override_active() {
        warn!("Development tenant override is enabled");
    }

    let state = AppState {
        resolver: Arc::new(TenantResolver::new(Arc::clone(&directory)).with_config(resolver_config)),
        access_control: Arc::new(AccessControlService::new(grants, patients)),
        tenant_admin: Arc::new(TenantAdminService::new(directory, connections)),
    };

    let app = routes::create_router(state);

    let cors_layer = if config.server.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use axum::http::{HeaderValue, Method};
        let origins: Vec<HeaderValue> = config
            .server
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH])
            .allow_headers(Any)
    };

    // first added = innermost
    let app = app
        .layer(RequestBodyLimitLayer::new(config.server.max_body_bytes))
        .layer(TraceLayer::new_for_http());
    let app = if config.server.cors_enabled {
        app.layer(cors_layer)
    } else {
        app
    };

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout()))
        .await?;

    router.shutdown().await;
    platform.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    info!("Waiting up to {:?} for connections to close", timeout);
}
