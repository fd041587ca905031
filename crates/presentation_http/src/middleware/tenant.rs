//! Tenant extractor
//!
//! Collects the tenant signals of a request (`Host`, `X-Tenant-Code` or the
//! `tenant` query parameter, `X-Dev-Tenant`) into a [`RequestContext`] and
//! resolves it. Handlers that take [`CurrentTenant`] never run for a request
//! whose tenant is unknown.

use application::RequestContext;
use axum::{
    extract::{FromRequestParts, Query},
    http::{HeaderMap, header::HOST, request::Parts},
};
use domain::ResolvedTenant;
use serde::Deserialize;
use tracing::debug;

use crate::{error::ApiError, middleware::request_id::RequestId, state::AppState};

/// Header carrying an explicit tenant code
pub const TENANT_CODE_HEADER: &str = "X-Tenant-Code";

/// Development-only tenant override header
pub const DEV_TENANT_HEADER: &str = "X-Dev-Tenant";

#[derive(Debug, Default, Deserialize)]
struct TenantQuery {
    tenant: Option<String>,
}

/// The tenant resolved for the current request
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub ResolvedTenant);

impl FromRequestParts<AppState> for CurrentTenant {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = request_context(parts);
        let tenant = state.resolver.resolve(&ctx).await?;
        debug!(tenant = %tenant.code(), request_id = %ctx.request_id(), "Tenant resolved");
        Ok(Self(tenant))
    }
}

/// Build the resolver input from request parts
fn request_context(parts: &Parts) -> RequestContext {
    let mut ctx = parts
        .extensions
        .get::<RequestId>()
        .map_or_else(RequestContext::new, |id| {
            RequestContext::with_request_id(id.as_uuid())
        });

    if let Some(host) = header(&parts.headers, HOST.as_str()).or_else(|| parts.uri.host()) {
        ctx = ctx.with_hostname(host);
    }

    let query_code = Query::<TenantQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.tenant);
    if let Some(code) = header(&parts.headers, TENANT_CODE_HEADER)
        .map(str::to_string)
        .or(query_code)
    {
        ctx = ctx.with_explicit_code(code);
    }

    if let Some(code) = header(&parts.headers, DEV_TENANT_HEADER) {
        ctx = ctx.with_dev_override(code);
    }

    ctx
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
