//! Tenant code value object
//!
//! The tenant code is the immutable, globally unique slug of a tenant. It is
//! safe to embed in hostnames, URLs and file names.
//!
//! # Examples
//!
//! ```
//! use domain::TenantCode;
//!
//! let code = TenantCode::parse("Acme-Clinic").unwrap();
//! assert_eq!(code.as_str(), "acme-clinic");
//!
//! assert!(TenantCode::parse("ab").is_err());
//! assert!(TenantCode::parse("-acme").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Minimum length for tenant codes
pub const MIN_TENANT_CODE_LEN: usize = 3;

/// Maximum length for tenant codes (one DNS label)
pub const MAX_TENANT_CODE_LEN: usize = 63;

/// Validated tenant slug
///
/// Rules:
/// - 3-63 characters
/// - lowercase ASCII alphanumerics and `-` (input is lowercased first)
/// - must start with an alphanumeric character
/// - must not end with `-`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantCode(String);

impl TenantCode {
    /// Parse and normalize a tenant code
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let code = raw.trim().to_ascii_lowercase();

        if code.len() < MIN_TENANT_CODE_LEN || code.len() > MAX_TENANT_CODE_LEN {
            return Err(DomainError::InvalidTenantCode(format!(
                "'{raw}' must be {MIN_TENANT_CODE_LEN}-{MAX_TENANT_CODE_LEN} characters"
            )));
        }

        if !code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(DomainError::InvalidTenantCode(format!(
                "'{raw}' may only contain letters, digits and '-'"
            )));
        }

        if code.starts_with('-') || code.ends_with('-') {
            return Err(DomainError::InvalidTenantCode(format!(
                "'{raw}' must not start or end with '-'"
            )));
        }

        Ok(Self(code))
    }

    /// Get the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TenantCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TenantCode> for String {
    fn from(code: TenantCode) -> Self {
        code.0
    }
}

impl std::str::FromStr for TenantCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
