//! Tenant domain identifier

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Identifier of a hostname registered to a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainId(i64);

impl DomainId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(DomainError::InvalidIdentifier(format!("domain id '{s}'"))),
        }
    }

    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
