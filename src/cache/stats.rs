//! Cache Statistics Module
//!
//! Tracks cache performance counters and builds the diagnostic report
//! served by the admin surface.

use serde::Serialize;

use crate::cache::entry::current_timestamp_ms;

/// How many entries the diagnostic report lists, ordered by access count.
pub const TOP_KEYS_LIMIT: usize = 10;

// == Cache Stats ==
/// Raw performance counters for one cache instance.
///
/// Counters survive `clear()`; only the owning store updates them.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of stores (including overwrites)
    pub sets: u64,
    /// Number of explicit removals that found an entry
    pub deletes: u64,
    /// Number of entries evicted by the LRU policy
    pub evictions: u64,
    /// Instance creation timestamp (Unix milliseconds)
    pub start_time: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self {
            hits: 0,
            misses: 0,
            sets: 0,
            deletes: 0,
            evictions: 0,
            start_time: current_timestamp_ms(),
        }
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Uptime ==
    /// Milliseconds since the owning instance was created.
    pub fn uptime_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.start_time)
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

// == Key Stats ==
/// Per-entry diagnostics line in the cache report.
#[derive(Debug, Clone, Serialize)]
pub struct KeyStats {
    /// The entry's key
    pub key: String,
    /// Reads of this entry
    pub hits: u64,
    /// Approximate serialized size in bytes
    pub size: usize,
}

// == Cache Report ==
/// Point-in-time statistics snapshot for one cache instance.
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    /// Current number of entries
    pub total_entries: usize,
    /// hits / (hits + misses), 0 when no requests were made yet
    pub hit_rate: f64,
    pub total_hits: u64,
    pub total_misses: u64,
    pub total_sets: u64,
    pub total_deletes: u64,
    pub total_evictions: u64,
    /// Sum of approximate entry sizes in bytes
    pub memory_usage: usize,
    /// Milliseconds since the instance was created
    pub uptime_ms: u64,
    /// Most-read entries, largest access count first
    pub top_keys: Vec<KeyStats>,
}

impl CacheReport {
    /// Builds a report from raw counters and per-entry diagnostics.
    ///
    /// `keys` may arrive in any order; the report keeps the
    /// [`TOP_KEYS_LIMIT`] most-read entries.
    pub fn build(stats: &CacheStats, total_entries: usize, mut keys: Vec<KeyStats>) -> Self {
        let memory_usage = keys.iter().map(|k| k.size).sum();

        keys.sort_by(|a, b| b.hits.cmp(&a.hits));
        keys.truncate(TOP_KEYS_LIMIT);

        Self {
            total_entries,
            hit_rate: stats.hit_rate(),
            total_hits: stats.hits,
            total_misses: stats.misses,
            total_sets: stats.sets,
            total_deletes: stats.deletes,
            total_evictions: stats.evictions,
            memory_usage,
            uptime_ms: stats.uptime_ms(),
            top_keys: keys,
        }
    }
}
