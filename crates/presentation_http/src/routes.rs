//! Route definitions

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::{handlers, middleware::RequestIdLayer, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // Tab access control (tenant scoped)
        .route(
            "/api/access-control/doctor/{doctor_id}/tabs",
            get(handlers::access_control::get_doctor_tabs)
                .put(handlers::access_control::put_doctor_tabs),
        )
        .route(
            "/api/access-control/patient/{patient_id}/tabs",
            get(handlers::access_control::get_patient_tabs)
                .put(handlers::access_control::put_patient_tabs),
        )
        .route(
            "/api/access-control/patient/{patient_id}/access",
            get(handlers::access_control::get_patient_access)
                .put(handlers::access_control::put_patient_access),
        )
        .route(
            "/api/access-control/catalog/{kind}",
            get(handlers::access_control::get_catalog),
        )
        .route(
            "/api/access-control/check/{capability}",
            get(handlers::access_control::check_capability),
        )
        // Tenant administration
        .route(
            "/api/tenants/{id}",
            get(handlers::tenants::get_tenant).patch(handlers::tenants::update_tenant),
        )
        .route("/api/tenants/{id}/domains", post(handlers::tenants::add_domain))
        .route(
            "/api/tenants/{id}/domains/{domain_id}/verify",
            post(handlers::tenants::verify_domain),
        )
        .route("/api/tenants/{id}/status", patch(handlers::tenants::change_status))
        .layer(RequestIdLayer::new())
        // Attach state
        .with_state(state)
}
