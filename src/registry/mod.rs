//! Registry Module
//!
//! The fixed set of named per-entity cache instances and the invalidation
//! router that maps domain mutations onto them.

mod instances;
mod invalidation;

pub use instances::{CacheName, CacheRegistry, RegistryConfig, ResponseCache};
pub use invalidation::{CalendarCacheInvalidator, Entity, InvalidationRouter, MutationAction};
