//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and tag support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// Represents a single cache entry with value and access metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The stored value
    pub value: T,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds); always greater than `created_at`
    pub expires_at: u64,
    /// Last access timestamp (Unix milliseconds)
    pub accessed_at: u64,
    /// Number of successful reads of this entry
    pub access_count: u64,
    /// Labels used for bulk invalidation
    pub tags: Vec<String>,
    /// Approximate byte size of the serialized value (reporting only)
    pub size: usize,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Lifetime of the entry from creation
    /// * `tags` - Invalidation labels attached to the entry
    /// * `size` - Approximate serialized size in bytes
    pub fn new(value: T, ttl: Duration, tags: Vec<String>, size: usize) -> Self {
        let now = current_timestamp_ms();

        Self {
            value,
            created_at: now,
            // A zero TTL still yields expires_at > created_at
            expires_at: now + (ttl.as_millis() as u64).max(1),
            accessed_at: now,
            access_count: 0,
            tags,
            size,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is considered expired when the current
    /// time is greater than or equal to the expiration time, so an entry is
    /// treated as absent the moment its TTL has fully elapsed, whether or
    /// not a background sweep has removed it yet.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Mark Accessed ==
    /// Records a successful read, optionally sliding the expiry forward.
    ///
    /// With `refresh_ttl` set, the expiration is reset to `now + ttl`
    /// (sliding expiration); otherwise only access metadata changes.
    pub fn mark_accessed(&mut self, refresh_ttl: Option<Duration>) {
        let now = current_timestamp_ms();
        self.accessed_at = now;
        self.access_count += 1;

        if let Some(ttl) = refresh_ttl {
            self.expires_at = now + (ttl.as_millis() as u64).max(1);
        }
    }

    // == Tag Intersection ==
    /// Returns true if any of the given tags is attached to this entry.
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        let now = current_timestamp_ms();
        self.expires_at.saturating_sub(now)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
