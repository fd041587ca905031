//! Tenant connection routing
//!
//! Maps a tenant to its isolated storage handle, caching one handle per
//! tenant and invalidating it on lifecycle changes.

mod connection_router;
mod sqlite_pool_factory;

pub use connection_router::{ConnectionRouter, HandleFactory, RouterConfig};
pub use sqlite_pool_factory::{SqlitePoolFactory, TenantRouter};
