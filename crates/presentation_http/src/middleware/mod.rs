//! HTTP middleware and extractors
//!
//! Request correlation, validated JSON bodies and per-request tenant
//! resolution.

pub mod request_id;
pub mod tenant;
pub mod validation;

pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdLayer};
pub use tenant::{CurrentTenant, DEV_TENANT_HEADER, TENANT_CODE_HEADER};
pub use validation::{ValidatedJson, ValidationError};
