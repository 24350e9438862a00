//! API Module
//!
//! HTTP layer: the read-through and invalidation middleware that host
//! applications attach to their routes, plus the admin surface for
//! statistics and manual invalidation.

pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod policy;
pub mod routes;

pub use handlers::AppState;
pub use identity::{identity_layer, CallerIdentity, Role, ANONYMOUS_SCOPE};
pub use middleware::{invalidate_on_write, read_through, CacheContext, CACHE_STATUS_HEADER};
pub use policy::{
    is_cacheable_method, mutation_action, should_store, KeyScope, RouteCache, MAX_CACHEABLE_BODY,
};
pub use routes::create_router;
