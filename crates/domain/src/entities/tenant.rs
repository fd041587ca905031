//! Tenant entity
//!
//! A tenant is an isolated customer organization (clinic, hospital,
//! practitioner) sharing the deployment. Tenants own a list of hostnames;
//! exactly one of them is primary once any exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{
    DomainId, Hostname, ResolvedTenant, TenantCode, TenantId, TenantStatus,
};

/// Verification state of a tenant hostname
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Registered, ownership not yet confirmed
    #[default]
    Pending,
    /// Ownership confirmed
    Verified,
    /// Verification attempted and failed
    Failed,
}

impl VerificationStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Failed => "failed",
        }
    }
}

impl std::str::FromStr for VerificationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "failed" => Ok(Self::Failed),
            other => Err(DomainError::ValidationError(format!(
                "unknown verification status '{other}'"
            ))),
        }
    }
}

/// A hostname registered to a tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantDomain {
    pub id: DomainId,
    pub hostname: Hostname,
    pub is_primary: bool,
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
}

impl TenantDomain {
    /// Whether requests for this hostname may be routed to the tenant
    ///
    /// The primary domain always routes; alternates only once verified.
    #[must_use]
    pub fn routes_requests(&self) -> bool {
        self.is_primary || self.verification_status == VerificationStatus::Verified
    }
}

/// Contact details of a tenant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Partial update of a tenant's administrative fields
///
/// `None` leaves the field untouched. `code` is immutable and not part of
/// the update; status changes go through the status transition path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantUpdate {
    pub name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
}

impl TenantUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.contact_email.is_none()
            && self.contact_phone.is_none()
            && self.address.is_none()
    }
}

/// Tenant registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub code: TenantCode,
    pub name: String,
    pub status: TenantStatus,
    pub contact: TenantContact,
    pub domains: Vec<TenantDomain>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// The primary domain, if any domain is registered
    #[must_use]
    pub fn primary_domain(&self) -> Option<&TenantDomain> {
        self.domains.iter().find(|d| d.is_primary)
    }

    /// Find a registered domain by id
    #[must_use]
    pub fn domain(&self, id: DomainId) -> Option<&TenantDomain> {
        self.domains.iter().find(|d| d.id == id)
    }

    /// Whether the primary-domain invariant holds
    ///
    /// No domains, or exactly one primary.
    #[must_use]
    pub fn has_consistent_primary(&self) -> bool {
        self.domains.is_empty() || self.domains.iter().filter(|d| d.is_primary).count() == 1
    }

    /// Project to the value carried through a request
    #[must_use]
    pub fn to_resolved(&self) -> ResolvedTenant {
        ResolvedTenant::new(self.id, self.code.clone(), self.status, self.name.clone())
    }
}
