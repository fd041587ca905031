//! Principal value objects
//!
//! A principal is an individual account (doctor/staff or patient) whose
//! dashboard tabs are gated by the access control store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Kind of principal a capability catalog is defined for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    /// Staff account (doctors, nurses, front desk)
    Doctor,
    /// Patient portal account
    Patient,
}

impl PrincipalKind {
    /// All principal kinds, in a stable order
    pub const ALL: [Self; 2] = [Self::Doctor, Self::Patient];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Patient => "patient",
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PrincipalKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "doctor" | "staff" => Ok(Self::Doctor),
            "patient" => Ok(Self::Patient),
            other => Err(DomainError::ValidationError(format!(
                "unknown principal kind '{other}'"
            ))),
        }
    }
}

/// Identifier of a doctor or patient within one tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(i64);

impl PrincipalId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Parse a principal id from a path segment
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(DomainError::InvalidIdentifier(format!("principal id '{s}'"))),
        }
    }

    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_str() {
        assert_eq!("doctor".parse::<PrincipalKind>().unwrap(), PrincipalKind::Doctor);
        assert_eq!("Staff".parse::<PrincipalKind>().unwrap(), PrincipalKind::Doctor);
        assert_eq!("patient".parse::<PrincipalKind>().unwrap(), PrincipalKind::Patient);
        assert!("nurse".parse::<PrincipalKind>().is_err());
    }

    #[test]
    fn kind_serialization() {
        let json = serde_json::to_string(&PrincipalKind::Patient).unwrap();
        assert_eq!(json, r#""patient""#);
    }

    #[test]
    fn principal_id_parse() {
        assert_eq!(PrincipalId::parse("42").unwrap().as_i64(), 42);
        assert!(PrincipalId::parse("0").is_err());
        assert!(PrincipalId::parse("x").is_err());
    }
}
