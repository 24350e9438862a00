//! Data models for the cache engine
//!
//! The stored response payload and the DTOs serialized into HTTP
//! response bodies by the administration API.

pub mod cached_response;
pub mod responses;

// Re-export commonly used types
pub use cached_response::CachedResponse;
pub use responses::{
    AggregateStats, ClearResponse, ErrorResponse, HealthResponse, InvalidateResponse,
    StatsResponse,
};
