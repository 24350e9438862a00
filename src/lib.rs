//! Fleet Cache - in-memory response caching for a fleet management API
//!
//! Named per-entity cache instances with TTL expiration, LRU eviction and
//! tag-based invalidation, plus the HTTP middleware that serves cached
//! responses and invalidates on writes.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod tasks;

pub use api::{create_router, AppState, CacheContext, RouteCache};
pub use cache::{CacheConfig, CacheService, SetOptions};
pub use config::Config;
pub use registry::{CacheName, CacheRegistry, InvalidationRouter, RegistryConfig};
pub use tasks::spawn_sweep_task;
