//! Request context carrying tenant signals
//!
//! The HTTP layer extracts every tenant signal it can find on an inbound
//! request into a [`RequestContext`] and hands it to the tenant resolver.
//! The context itself makes no decision; priority rules live in
//! [`TenantResolver`](crate::services::TenantResolver).
//!
//! # Examples
//!
//! ```
//! use application::RequestContext;
//!
//! let ctx = RequestContext::new()
//!     .with_hostname("acme.example.com")
//!     .with_explicit_code("acme");
//!
//! assert_eq!(ctx.hostname(), Some("acme.example.com"));
//! assert_eq!(ctx.explicit_code(), Some("acme"));
//! assert!(!ctx.request_id().is_nil());
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Tenant signals and metadata of a single request
#[derive(Debug, Clone)]
pub struct RequestContext {
    hostname: Option<String>,
    explicit_code: Option<String>,
    dev_override: Option<String>,
    request_id: Uuid,
    timestamp: DateTime<Utc>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    /// Create an empty context with a fresh request ID
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(Uuid::now_v7())
    }

    /// Create an empty context correlated with an upstream request ID
    #[must_use]
    pub fn with_request_id(request_id: Uuid) -> Self {
        Self {
            hostname: None,
            explicit_code: None,
            dev_override: None,
            request_id,
            timestamp: Utc::now(),
        }
    }

    /// Set the `Host` the request was addressed to
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = non_blank(hostname.into());
        self
    }

    /// Set an explicit tenant code (header or query parameter)
    #[must_use]
    pub fn with_explicit_code(mut self, code: impl Into<String>) -> Self {
        self.explicit_code = non_blank(code.into());
        self
    }

    /// Set a development-only override code
    #[must_use]
    pub fn with_dev_override(mut self, code: impl Into<String>) -> Self {
        self.dev_override = non_blank(code.into());
        self
    }

    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    #[must_use]
    pub fn explicit_code(&self) -> Option<&str> {
        self.explicit_code.as_deref()
    }

    #[must_use]
    pub fn dev_override(&self) -> Option<&str> {
        self.dev_override.as_deref()
    }

    /// Whether the request carries any tenant signal at all
    #[must_use]
    pub const fn has_tenant_signal(&self) -> bool {
        self.hostname.is_some() || self.explicit_code.is_some() || self.dev_override.is_some()
    }

    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }

    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
