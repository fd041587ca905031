//! Tab access control handlers
//!
//! All routes here are tenant scoped through [`CurrentTenant`]. Reads of
//! enabled tabs never fail on storage errors (the default set is served);
//! writes report every failure.

use application::{AccessSubject, ApplicationError, Role};
use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use domain::{CATALOG_VERSION, CapabilityDefinition, PrincipalId, PrincipalKind};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::ApiError,
    middleware::{CurrentTenant, ValidatedJson},
    state::AppState,
};

/// Header carrying the caller's role, as asserted by the session layer
pub const CALLER_ROLE_HEADER: &str = "X-Caller-Role";

/// Header carrying the caller's principal id
pub const CALLER_ID_HEADER: &str = "X-Caller-Id";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabsResponse {
    pub tabs: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTabsRequest {
    #[validate(length(max = 64, message = "too many tabs"))]
    pub tabs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTabsResponse {
    pub success: bool,
    pub tabs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientAccessResponse {
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePatientAccessRequest {
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePatientAccessResponse {
    pub success: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogResponse {
    pub kind: PrincipalKind,
    pub version: u32,
    pub capabilities: &'static [CapabilityDefinition],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityCheckResponse {
    pub capability: String,
    pub allowed: bool,
}

fn parse_principal(raw: &str) -> Result<PrincipalId, ApiError> {
    PrincipalId::parse(raw).map_err(|e| ApplicationError::from(e).into())
}

async fn get_tabs(
    state: &AppState,
    tenant: &CurrentTenant,
    kind: PrincipalKind,
    raw_id: &str,
) -> Result<Json<TabsResponse>, ApiError> {
    let principal = parse_principal(raw_id)?;
    let enabled = state
        .access_control
        .get_enabled(&tenant.0, kind, principal)
        .await?;
    Ok(Json(TabsResponse {
        tabs: enabled.into_tabs(),
    }))
}

async fn put_tabs(
    state: &AppState,
    tenant: &CurrentTenant,
    kind: PrincipalKind,
    raw_id: &str,
    request: UpdateTabsRequest,
) -> Result<Json<UpdateTabsResponse>, ApiError> {
    let principal = parse_principal(raw_id)?;
    let stored = state
        .access_control
        .set_enabled(&tenant.0, kind, principal, &request.tabs)
        .await?;
    Ok(Json(UpdateTabsResponse {
        success: true,
        tabs: stored.into_vec(),
    }))
}

/// `GET /api/access-control/doctor/{doctorId}/tabs`
pub async fn get_doctor_tabs(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Path(doctor_id): Path<String>,
) -> Result<Json<TabsResponse>, ApiError> {
    get_tabs(&state, &tenant, PrincipalKind::Doctor, &doctor_id).await
}

/// `PUT /api/access-control/doctor/{doctorId}/tabs`
pub async fn put_doctor_tabs(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Path(doctor_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateTabsRequest>,
) -> Result<Json<UpdateTabsResponse>, ApiError> {
    put_tabs(&state, &tenant, PrincipalKind::Doctor, &doctor_id, request).await
}

/// `GET /api/access-control/patient/{patientId}/tabs`
pub async fn get_patient_tabs(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Path(patient_id): Path<String>,
) -> Result<Json<TabsResponse>, ApiError> {
    get_tabs(&state, &tenant, PrincipalKind::Patient, &patient_id).await
}

/// `PUT /api/access-control/patient/{patientId}/tabs`
pub async fn put_patient_tabs(
    State(state): State<AppState>,
    tenant: CurrentTenant,
    Path(patient_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateTabsRequest>,
) -> Result<Json<UpdateTabsResponse>, ApiError> {
    put_tabs(&state, &tenant, PrincipalKind::Patient, &patient_id, request).await
}

/// `GET /api/access-control/patient/{patientId}/access`
pub async fn get_patient_access(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientAccessResponse>, ApiError> {
    let patient = parse_principal(&patient_id)?;
    let is_active = state.access_control.patient_access(&tenant, patient).await?;
    Ok(Json(PatientAccessResponse { is_active }))
}

/// `PUT /api/access-control/patient/{patientId}/access`
pub async fn put_patient_access(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    Path(patient_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdatePatientAccessRequest>,
) -> Result<Json<UpdatePatientAccessResponse>, ApiError> {
    let patient = parse_principal(&patient_id)?;
    let is_active = state
        .access_control
        .set_patient_access(&tenant, patient, request.is_active)
        .await?;
    Ok(Json(UpdatePatientAccessResponse {
        success: true,
        is_active,
    }))
}

/// `GET /api/access-control/catalog/{kind}`
pub async fn get_catalog(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let kind: PrincipalKind = kind.parse().map_err(ApplicationError::from)?;
    Ok(Json(CatalogResponse {
        kind,
        version: CATALOG_VERSION,
        capabilities: state.access_control.catalog(kind),
    }))
}

/// `GET /api/access-control/check/{capability}`
///
/// Answers for the caller named by the role and id headers.
pub async fn check_capability(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    Path(capability): Path<String>,
    headers: HeaderMap,
) -> Result<Json<CapabilityCheckResponse>, ApiError> {
    let subject = caller_subject(&headers)?;
    let allowed = state
        .access_control
        .has_capability(&tenant, &subject, &capability)
        .await?;
    Ok(Json(CapabilityCheckResponse {
        capability,
        allowed,
    }))
}

fn caller_subject(headers: &HeaderMap) -> Result<AccessSubject, ApiError> {
    let role: Role = headers
        .get(CALLER_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest(format!("missing {CALLER_ROLE_HEADER} header")))?
        .parse()?;
    let principal = headers
        .get(CALLER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(parse_principal)
        .transpose()?;
    Ok(AccessSubject::new(role, principal))
}
