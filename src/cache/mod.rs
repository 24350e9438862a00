//! Cache Module
//!
//! Generic in-memory caching with TTL expiry, LRU eviction, tag-based
//! invalidation and hit/miss statistics. [`CacheStore`] is the synchronous
//! engine; [`CacheService`] is the shared async handle the rest of the
//! crate depends on.

mod config;
mod entry;
mod lru;
mod service;
mod stats;
mod store;


// Re-export public types
pub use config::{CacheConfig, SetOptions};
pub use entry::CacheEntry;
pub use service::{CacheService, ExpireCallback};
pub use stats::{CacheReport, CacheStats, KeyStats, TOP_KEYS_LIMIT};
pub use store::CacheStore;
