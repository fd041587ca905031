//! Role to capability strategy table
//!
//! Each role maps to exactly one way of answering "which tabs may this
//! caller use". Adding a role means adding one table entry.

use std::{collections::HashMap, fmt, str::FromStr};

use domain::{EnabledCapabilities, PrincipalId, PrincipalKind};
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Caller role as asserted by the session layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Doctor,
    Patient,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Doctor => "doctor",
            Self::Patient => "patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "super_admin" | "superadmin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "doctor" | "staff" => Ok(Self::Doctor),
            "patient" => Ok(Self::Patient),
            other => Err(ApplicationError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

/// The caller whose capabilities are being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessSubject {
    pub role: Role,
    pub principal: Option<PrincipalId>,
}

impl AccessSubject {
    pub const fn new(role: Role, principal: Option<PrincipalId>) -> Self {
        Self { role, principal }
    }

    pub const fn admin() -> Self {
        Self::new(Role::Admin, None)
    }

    pub const fn doctor(id: PrincipalId) -> Self {
        Self::new(Role::Doctor, Some(id))
    }

    pub const fn patient(id: PrincipalId) -> Self {
        Self::new(Role::Patient, Some(id))
    }
}

/// How a role's capabilities are determined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityStrategy {
    /// Every capability, the grant store is never consulted
    AllCapabilities,
    /// Look up the principal's grant for the given catalog
    Grants(PrincipalKind),
}

/// Capabilities effective for one subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectiveCapabilities {
    /// All-capabilities sentinel
    All,
    /// Stored or default set from the grant store
    Enabled(EnabledCapabilities),
}

impl EffectiveCapabilities {
    #[must_use]
    pub fn allows(&self, capability: &str) -> bool {
        match self {
            Self::All => true,
            Self::Enabled(enabled) => enabled.contains(capability),
        }
    }
}

/// Strategy lookup keyed by role
#[derive(Debug, Clone)]
pub struct CapabilityStrategyTable {
    strategies: HashMap<Role, CapabilityStrategy>,
}

impl Default for CapabilityStrategyTable {
    fn default() -> Self {
        Self::empty()
            .with(Role::SuperAdmin, CapabilityStrategy::AllCapabilities)
            .with(Role::Admin, CapabilityStrategy::AllCapabilities)
            .with(Role::Doctor, CapabilityStrategy::Grants(PrincipalKind::Doctor))
            .with(Role::Patient, CapabilityStrategy::Grants(PrincipalKind::Patient))
    }
}

impl CapabilityStrategyTable {
    /// A table with no roles; every lookup fails
    #[must_use]
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Set the strategy for a role, replacing any previous entry
    #[must_use]
    pub fn with(mut self, role: Role, strategy: CapabilityStrategy) -> Self {
        self.strategies.insert(role, strategy);
        self
    }

    /// Strategy for a role
    ///
    /// # Errors
    ///
    /// [`ApplicationError::Validation`] if the role has no entry.
    pub fn strategy_for(&self, role: Role) -> Result<CapabilityStrategy, ApplicationError> {
        self.strategies
            .get(&role)
            .copied()
            .ok_or_else(|| ApplicationError::Validation(format!("no capability strategy for role '{role}'")))
    }
}
