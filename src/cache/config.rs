//! Cache Configuration Module
//!
//! Per-instance cache options. Every recognized option is an explicit
//! field with a documented default; values are validated once when the
//! owning store is constructed, never re-merged per call.

use std::time::Duration;

// == Cache Config ==
/// Configuration for one cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Lifetime of a new entry from creation (default: 5 minutes)
    pub ttl: Duration,
    /// Entry cap; inserting a new key at the cap evicts the
    /// least-recently-accessed entry first (default: 1000)
    pub max_entries: usize,
    /// Tags attached to every entry unless overridden per set
    /// (default: none)
    pub tags: Vec<String>,
    /// Whether a successful get extends the entry's expiry to now + ttl,
    /// implementing sliding expiration (default: true)
    pub refresh_on_access: bool,
}

impl CacheConfig {
    /// Returns a copy with out-of-range values clamped to usable minimums.
    ///
    /// A zero TTL or a zero capacity would make every operation a no-op,
    /// so both are raised to their smallest meaningful value.
    pub fn validated(mut self) -> Self {
        if self.ttl.is_zero() {
            self.ttl = Duration::from_millis(1);
        }
        if self.max_entries == 0 {
            self.max_entries = 1;
        }
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            max_entries: 1000,
            tags: Vec::new(),
            refresh_on_access: true,
        }
    }
}

// == Set Options ==
/// Per-call overrides for a single `set`.
///
/// `None` fields fall back to the instance [`CacheConfig`].
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    /// Override the entry's lifetime
    pub ttl: Option<Duration>,
    /// Replace the instance default tags for this entry
    pub tags: Option<Vec<String>>,
}

impl SetOptions {
    /// Override only the TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            tags: None,
        }
    }

    /// Override only the tags.
    pub fn with_tags(tags: Vec<String>) -> Self {
        Self {
            ttl: None,
            tags: Some(tags),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(300));
        assert_eq!(config.max_entries, 1000);
        assert!(config.tags.is_empty());
        assert!(config.refresh_on_access);
    }

    #[test]
    fn test_validated_clamps_zero_values() {
        let config = CacheConfig {
            ttl: Duration::ZERO,
            max_entries: 0,
            ..Default::default()
        }
        .validated();

        assert_eq!(config.ttl, Duration::from_millis(1));
        assert_eq!(config.max_entries, 1);
    }

    #[test]
    fn test_validated_keeps_sane_values() {
        let config = CacheConfig {
            ttl: Duration::from_secs(60),
            max_entries: 50,
            ..Default::default()
        }
        .validated();

        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.max_entries, 50);
    }

    #[test]
    fn test_set_options_builders() {
        let opts = SetOptions::with_ttl(Duration::from_secs(1));
        assert_eq!(opts.ttl, Some(Duration::from_secs(1)));
        assert!(opts.tags.is_none());

        let opts = SetOptions::with_tags(vec!["rentals".to_string()]);
        assert!(opts.ttl.is_none());
        assert_eq!(opts.tags.unwrap(), vec!["rentals".to_string()]);
    }
}
