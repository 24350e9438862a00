//! Response DTOs for the cache administration API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::CacheReport;

/// Response body for GET /api/cache/stats.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Per-instance statistics, keyed by cache name
    pub caches: BTreeMap<String, CacheReport>,
    /// Aggregates across all instances
    pub totals: AggregateStats,
}

/// Aggregate counters across every cache instance.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateStats {
    pub total_entries: usize,
    pub total_hits: u64,
    pub total_misses: u64,
    /// Sum of approximate entry sizes in bytes
    pub memory_usage: usize,
}

impl StatsResponse {
    /// Builds the response from per-instance reports.
    pub fn new(reports: Vec<(&'static str, CacheReport)>) -> Self {
        let mut totals = AggregateStats {
            total_entries: 0,
            total_hits: 0,
            total_misses: 0,
            memory_usage: 0,
        };

        let mut caches = BTreeMap::new();
        for (name, report) in reports {
            totals.total_entries += report.total_entries;
            totals.total_hits += report.total_hits;
            totals.total_misses += report.total_misses;
            totals.memory_usage += report.memory_usage;
            caches.insert(name.to_string(), report);
        }

        Self { caches, totals }
    }
}

/// Response body for POST /api/cache/clear.
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    /// Entries removed across all instances
    pub cleared: usize,
}

impl ClearResponse {
    pub fn new(cleared: usize) -> Self {
        Self {
            message: format!("All caches cleared: {cleared} entries removed"),
            cleared,
        }
    }
}

/// Response body for POST /api/cache/invalidate/:key.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub message: String,
    /// The entity name the invalidation router ran for
    pub entity: String,
    /// Entries removed by the fan-out (0 for an unknown entity)
    pub cleared: usize,
}

impl InvalidateResponse {
    pub fn new(entity: impl Into<String>, cleared: usize) -> Self {
        let entity = entity.into();
        Self {
            message: format!("Cache invalidated for entity '{entity}'"),
            entity,
            cleared,
        }
    }
}

/// Response body for the health endpoint (GET /health).
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp.
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
