//! Tenant administration handlers
//!
//! Platform-level routes addressed by tenant id; they do not go through
//! tenant resolution.

use application::ApplicationError;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use domain::{DomainId, Tenant, TenantDomain, TenantId, TenantStatus, TenantUpdate};
use serde::Deserialize;
use validator::Validate;

use crate::{error::ApiError, middleware::ValidatedJson, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTenantRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(length(max = 40))]
    pub contact_phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

impl From<UpdateTenantRequest> for TenantUpdate {
    fn from(req: UpdateTenantRequest) -> Self {
        Self {
            name: req.name,
            contact_email: req.contact_email,
            contact_phone: req.contact_phone,
            address: req.address,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddDomainRequest {
    #[validate(length(min = 1, max = 253))]
    pub hostname: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangeStatusRequest {
    pub status: TenantStatus,
}

fn parse_tenant_id(raw: &str) -> Result<TenantId, ApiError> {
    TenantId::parse(raw).map_err(|e| ApplicationError::from(e).into())
}

/// `GET /api/tenants/{id}`
pub async fn get_tenant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Tenant>, ApiError> {
    let id = parse_tenant_id(&id)?;
    Ok(Json(state.tenant_admin.get(id).await?))
}

/// `PATCH /api/tenants/{id}`
pub async fn update_tenant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateTenantRequest>,
) -> Result<Json<Tenant>, ApiError> {
    let id = parse_tenant_id(&id)?;
    Ok(Json(state.tenant_admin.update(id, request.into()).await?))
}

/// `POST /api/tenants/{id}/domains`
pub async fn add_domain(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<AddDomainRequest>,
) -> Result<(StatusCode, Json<TenantDomain>), ApiError> {
    let id = parse_tenant_id(&id)?;
    let domain = state
        .tenant_admin
        .add_domain(id, &request.hostname, request.is_primary)
        .await?;
    Ok((StatusCode::CREATED, Json(domain)))
}

/// `POST /api/tenants/{id}/domains/{domainId}/verify`
pub async fn verify_domain(
    State(state): State<AppState>,
    Path((id, domain_id)): Path<(String, String)>,
) -> Result<Json<TenantDomain>, ApiError> {
    let id = parse_tenant_id(&id)?;
    let domain_id = DomainId::parse(&domain_id).map_err(ApplicationError::from)?;
    Ok(Json(state.tenant_admin.verify_domain(id, domain_id).await?))
}

/// `PATCH /api/tenants/{id}/status`
pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<ChangeStatusRequest>,
) -> Result<Json<Tenant>, ApiError> {
    let id = parse_tenant_id(&id)?;
    Ok(Json(
        state.tenant_admin.change_status(id, request.status).await?,
    ))
}
