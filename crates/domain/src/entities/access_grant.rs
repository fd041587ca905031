//! Access grant records
//!
//! An access grant is the persisted override of the tabs enabled for one
//! principal within one tenant. Absence of a grant means every catalog tab
//! is enabled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::capability::{DASHBOARD, catalog_position, list_capabilities};
use crate::errors::DomainError;
use crate::value_objects::{PrincipalId, PrincipalKind};

/// Ordered set of enabled capability ids
///
/// Always a subset of the catalog for its principal kind, always contains
/// [`DASHBOARD`], and always in catalog display order without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CapabilitySet(Vec<String>);

impl CapabilitySet {
    /// Every capability in the catalog (the default-open set)
    #[must_use]
    pub fn full(kind: PrincipalKind) -> Self {
        Self(
            list_capabilities(kind)
                .iter()
                .map(|c| c.id.to_string())
                .collect(),
        )
    }

    /// Normalize a caller-requested set before persisting it
    ///
    /// Rejects ids outside the catalog, forces [`DASHBOARD`] in, drops
    /// duplicates and sorts into catalog order.
    pub fn from_requested<I, S>(kind: PrincipalKind, requested: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut positions = Vec::new();
        for id in requested {
            let id = id.as_ref().trim();
            let position = catalog_position(kind, id)
                .ok_or_else(|| DomainError::unknown_capability(kind.as_str(), id))?;
            positions.push(position);
        }
        Ok(Self::from_positions(kind, positions))
    }

    /// Rebuild a set from stored ids
    ///
    /// Ids no longer in the catalog are dropped silently; [`DASHBOARD`] is
    /// forced in.
    pub fn from_stored<I, S>(kind: PrincipalKind, stored: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let positions = stored
            .into_iter()
            .filter_map(|id| catalog_position(kind, id.as_ref()))
            .collect();
        Self::from_positions(kind, positions)
    }

    fn from_positions(kind: PrincipalKind, mut positions: Vec<usize>) -> Self {
        // dashboard is always position 0
        positions.push(0);
        positions.sort_unstable();
        positions.dedup();

        let catalog = list_capabilities(kind);
        Self(
            positions
                .into_iter()
                .map(|p| catalog[p].id.to_string())
                .collect(),
        )
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|c| c == id)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Persisted enabled-tab set for one principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessGrant {
    pub principal_kind: PrincipalKind,
    pub principal_id: PrincipalId,
    pub capabilities: CapabilitySet,
    pub updated_at: DateTime<Utc>,
}

/// Result of reading a principal's enabled tabs
///
/// Distinguishes "an administrator stored this set" from "nothing was ever
/// stored, the default applies", even though both serialize the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<String>", from = "Vec<String>")]
pub enum EnabledCapabilities {
    /// A grant record exists
    Stored(Vec<String>),
    /// No grant record (or the read failed); every catalog tab applies
    DefaultApplied(Vec<String>),
}

impl EnabledCapabilities {
    #[must_use]
    pub fn stored(set: CapabilitySet) -> Self {
        Self::Stored(set.into_vec())
    }

    #[must_use]
    pub fn default_for(kind: PrincipalKind) -> Self {
        Self::DefaultApplied(CapabilitySet::full(kind).into_vec())
    }

    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::DefaultApplied(_))
    }

    #[must_use]
    pub fn tabs(&self) -> &[String] {
        match self {
            Self::Stored(tabs) | Self::DefaultApplied(tabs) => tabs,
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.tabs().iter().any(|t| t == id)
    }

    #[must_use]
    pub fn into_tabs(self) -> Vec<String> {
        match self {
            Self::Stored(tabs) | Self::DefaultApplied(tabs) => tabs,
        }
    }
}

impl From<EnabledCapabilities> for Vec<String> {
    fn from(value: EnabledCapabilities) -> Self {
        value.into_tabs()
    }
}

impl From<Vec<String>> for EnabledCapabilities {
    fn from(tabs: Vec<String>) -> Self {
        Self::Stored(tabs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_set_matches_catalog() {
        let set = CapabilitySet::full(PrincipalKind::Doctor);
        assert_eq!(set.len(), 24);
        assert!(set.contains(DASHBOARD));
    }

    #[test]
    fn requested_set_forces_dashboard() {
        let set = CapabilitySet::from_requested(PrincipalKind::Doctor, ["appointments"]).unwrap();
        assert_eq!(set.as_slice(), ["dashboard", "appointments"]);
    }

    #[test]
    fn requested_set_is_sorted_and_deduplicated() {
        let set = CapabilitySet::from_requested(
            PrincipalKind::Patient,
            ["profile", "billing", "profile", "dashboard"],
        )
        .unwrap();
        assert_eq!(set.as_slice(), ["dashboard", "billing", "profile"]);
    }

    #[test]
    fn requested_unknown_id_is_rejected() {
        let err = CapabilitySet::from_requested(PrincipalKind::Patient, ["lab_tests"]).unwrap_err();
        assert!(matches!(err, DomainError::UnknownCapability { .. }));
    }

    #[test]
    fn empty_request_yields_dashboard_only() {
        let set = CapabilitySet::from_requested(PrincipalKind::Doctor, Vec::<String>::new()).unwrap();
        assert_eq!(set.as_slice(), ["dashboard"]);
    }

    #[test]
    fn stored_set_drops_retired_ids() {
        let set = CapabilitySet::from_stored(
            PrincipalKind::Doctor,
            ["appointments", "fax_machine", "dashboard"],
        );
        assert_eq!(set.as_slice(), ["dashboard", "appointments"]);
    }

    #[test]
    fn stored_set_restores_missing_dashboard() {
        let set = CapabilitySet::from_stored(PrincipalKind::Patient, ["billing"]);
        assert_eq!(set.as_slice(), ["dashboard", "billing"]);
    }

    #[test]
    fn enabled_capabilities_tags() {
        let default = EnabledCapabilities::default_for(PrincipalKind::Patient);
        assert!(default.is_default());
        assert_eq!(default.tabs().len(), 13);

        let stored = EnabledCapabilities::stored(CapabilitySet::full(PrincipalKind::Patient));
        assert!(!stored.is_default());
        assert_eq!(stored.tabs(), default.tabs());
    }

    #[test]
    fn enabled_capabilities_serialize_as_plain_list() {
        let stored = EnabledCapabilities::Stored(vec!["dashboard".to_string()]);
        assert_eq!(serde_json::to_string(&stored).unwrap(), r#"["dashboard"]"#);
    }
}
