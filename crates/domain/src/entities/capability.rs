//! Capability (dashboard tab) catalog
//!
//! Static, in-process table of every tab a principal kind can be granted.
//! The order of each table is the canonical display order.
//!
//! The catalog is append-only: stored allow-lists reference these ids, so an
//! id must never be removed or renamed. Bump [`CATALOG_VERSION`] when adding
//! entries.

use serde::Serialize;

use crate::value_objects::PrincipalKind;

/// Version of the catalog tables below
pub const CATALOG_VERSION: u32 = 1;

/// Mandatory capability present for every principal
pub const DASHBOARD: &str = "dashboard";

/// A single tab / feature surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub principal_kind: PrincipalKind,
}

const fn doctor(
    id: &'static str,
    name: &'static str,
    description: &'static str,
) -> CapabilityDefinition {
    CapabilityDefinition {
        id,
        name,
        description,
        principal_kind: PrincipalKind::Doctor,
    }
}

const fn patient(
    id: &'static str,
    name: &'static str,
    description: &'static str,
) -> CapabilityDefinition {
    CapabilityDefinition {
        id,
        name,
        description,
        principal_kind: PrincipalKind::Patient,
    }
}

/// Doctor / staff dashboard tabs
pub static DOCTOR_CAPABILITIES: [CapabilityDefinition; 24] = [
    doctor(DASHBOARD, "Dashboard", "Overview of the day and key figures"),
    doctor("appointments", "Appointments", "Calendar and appointment booking"),
    doctor("patients", "Patients", "Patient directory and demographics"),
    doctor("medical_records", "Medical Records", "Clinical notes and history"),
    doctor("prescriptions", "Prescriptions", "Issue and review prescriptions"),
    doctor("lab_tests", "Lab Tests", "Order lab tests and review results"),
    doctor("imaging", "Imaging", "Radiology orders and reports"),
    doctor("billing", "Billing", "Charges and payments"),
    doctor("invoices", "Invoices", "Invoice generation and history"),
    doctor("inventory", "Inventory", "Medication and supply stock"),
    doctor("staff", "Staff", "Staff directory and roles"),
    doctor("schedule", "Schedule", "Shift and availability planning"),
    doctor("messages", "Messages", "Secure messaging with patients and staff"),
    doctor("notifications", "Notifications", "Alerts and reminders"),
    doctor("reports", "Reports", "Operational and clinical reports"),
    doctor("analytics", "Analytics", "Charts and trends"),
    doctor("telemedicine", "Telemedicine", "Video consultations"),
    doctor("referrals", "Referrals", "Outgoing and incoming referrals"),
    doctor("vaccinations", "Vaccinations", "Immunization records"),
    doctor("documents", "Documents", "Uploaded files and forms"),
    doctor("insurance", "Insurance", "Coverage and claims"),
    doctor("settings", "Settings", "Practice configuration"),
    doctor("profile", "Profile", "Own account details"),
    doctor("audit_log", "Audit Log", "History of sensitive actions"),
];

/// Patient portal tabs
pub static PATIENT_CAPABILITIES: [CapabilityDefinition; 13] = [
    patient(DASHBOARD, "Dashboard", "Personal overview"),
    patient("appointments", "Appointments", "Upcoming and past visits"),
    patient("medical_records", "Medical Records", "Visit summaries and history"),
    patient("prescriptions", "Prescriptions", "Active and past prescriptions"),
    patient("lab_results", "Lab Results", "Released lab results"),
    patient("billing", "Billing", "Statements and payments"),
    patient("messages", "Messages", "Secure messages with the practice"),
    patient("notifications", "Notifications", "Reminders and alerts"),
    patient("documents", "Documents", "Shared documents"),
    patient("vaccinations", "Vaccinations", "Immunization record"),
    patient("telemedicine", "Telemedicine", "Join video consultations"),
    patient("insurance", "Insurance", "Coverage details"),
    patient("profile", "Profile", "Personal details"),
];

/// List the catalog for a principal kind in canonical display order
#[must_use]
pub fn list_capabilities(kind: PrincipalKind) -> &'static [CapabilityDefinition] {
    match kind {
        PrincipalKind::Doctor => &DOCTOR_CAPABILITIES,
        PrincipalKind::Patient => &PATIENT_CAPABILITIES,
    }
}

/// Position of a capability id in the catalog, if known
#[must_use]
pub fn catalog_position(kind: PrincipalKind, id: &str) -> Option<usize> {
    list_capabilities(kind).iter().position(|c| c.id == id)
}

/// Whether `id` is part of the catalog for `kind`
#[must_use]
pub fn is_known_capability(kind: PrincipalKind, id: &str) -> bool {
    catalog_position(kind, id).is_some()
}
