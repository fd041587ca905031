//! CareGate HTTP presentation layer
//!
//! Axum routes for tab access control and tenant administration. Every
//! tenant-scoped route resolves its tenant from the request before the
//! handler runs.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use middleware::{CurrentTenant, RequestIdLayer, ValidatedJson, ValidationError};
pub use routes::create_router;
pub use state::AppState;
