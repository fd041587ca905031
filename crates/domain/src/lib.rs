//! Domain layer for CareGate
//!
//! Contains the tenant and capability model: tenants and their domains,
//! tenant status rules, the static tab catalog and access grant sets.
//! This layer has no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

// Re-export tenant module for convenient access
pub use value_objects::tenant;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
