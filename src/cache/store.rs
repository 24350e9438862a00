//! Cache Store Module
//!
//! The synchronous cache engine: HashMap storage with LRU eviction,
//! TTL expiry and tag-based bulk invalidation. Values are any cloneable,
//! JSON-serializable type; serialization is used only to approximate
//! entry sizes for reporting.

use std::collections::HashMap;

use serde::Serialize;

use crate::cache::config::{CacheConfig, SetOptions};
use crate::cache::entry::CacheEntry;
use crate::cache::lru::LruTracker;
use crate::cache::stats::{CacheReport, CacheStats, KeyStats};

// == Cache Store ==
/// Keyed in-memory store with TTL expiry and a bounded entry count.
///
/// A cache miss is never an error: `get` returns `None` for absent and
/// expired entries alike. Expired entries are removed lazily on access
/// and eagerly by [`sweep_expired`](CacheStore::sweep_expired).
#[derive(Debug)]
pub struct CacheStore<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance counters
    stats: CacheStats,
    /// Instance configuration, validated at construction
    config: CacheConfig,
}

impl<T: Clone + Serialize> CacheStore<T> {
    // == Constructor ==
    /// Creates a new store from the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            config: config.validated(),
        }
    }

    /// The instance configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Set ==
    /// Stores or overwrites an entry.
    ///
    /// When the store is at capacity and `key` is new, the
    /// least-recently-accessed entry is evicted first. Overwriting never
    /// errors. The only failure mode is the value refusing to serialize
    /// for size estimation, in which case nothing is stored.
    pub fn set(
        &mut self,
        key: &str,
        value: T,
        options: SetOptions,
    ) -> Result<(), serde_json::Error> {
        // Size the value before touching any state
        let size = serde_json::to_vec(&value)?.len();

        let is_overwrite = self.entries.contains_key(key);

        if !is_overwrite && self.entries.len() >= self.config.max_entries {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                tracing::debug!(key = %evicted, "evicted least recently used entry");
            }
        }

        let ttl = options.ttl.unwrap_or(self.config.ttl);
        let tags = options.tags.unwrap_or_else(|| self.config.tags.clone());

        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl, tags, size));
        self.lru.touch(key);
        self.stats.record_set();

        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key, cloning it out of the store.
    ///
    /// An entry whose expiry has passed is removed and counted as a miss,
    /// even if no sweep has run yet. A hit updates the entry's access
    /// metadata and, with `refresh_on_access`, slides its expiry forward.
    pub fn get(&mut self, key: &str) -> Option<T> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_miss();
            tracing::debug!(key, reason = "expired", "cache miss");
            return None;
        }

        let refresh = self.config.refresh_on_access.then_some(self.config.ttl);
        let value = self.entries.get_mut(key).map(|entry| {
            entry.mark_accessed(refresh);
            entry.value.clone()
        });

        if value.is_some() {
            self.lru.touch(key);
            self.stats.record_hit();
        }
        value
    }

    // == Has ==
    /// Existence check with the same lazy-expiry semantics as `get`, but
    /// with no effect on hit/miss counters or access metadata.
    pub fn has(&mut self, key: &str) -> bool {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return false,
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            return false;
        }
        true
    }

    // == Delete ==
    /// Removes an entry if present; returns whether it existed.
    ///
    /// The `deletes` counter increments only on actual removal.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
            self.stats.record_delete();
            true
        } else {
            false
        }
    }

    // == Remove If Expired ==
    /// Removes an entry only when its expiry has passed, returning the
    /// value. Used by the one-shot expiry timers on the service wrapper.
    pub fn remove_if_expired(&mut self, key: &str) -> Option<T> {
        let expired = self.entries.get(key).is_some_and(|entry| entry.is_expired());
        if !expired {
            return None;
        }

        let entry = self.entries.remove(key)?;
        self.lru.remove(key);
        Some(entry.value)
    }

    // == Clear ==
    /// Removes all entries; hit/miss counters survive.
    ///
    /// Returns the number of entries removed.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        count
    }

    // == Clear By Tags ==
    /// Removes every entry whose tag set intersects `tags`.
    ///
    /// Returns the number of entries removed.
    pub fn clear_by_tags(&mut self, tags: &[String]) -> usize {
        let matching: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.has_any_tag(tags))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &matching {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        matching.len()
    }

    // == Sweep Expired ==
    /// Removes all entries whose expiry has already passed, catching
    /// entries that were never re-accessed since expiring.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        expired.len()
    }

    // == Report ==
    /// Builds the diagnostic statistics snapshot for this instance.
    pub fn report(&self) -> CacheReport {
        let keys = self
            .entries
            .iter()
            .map(|(key, entry)| KeyStats {
                key: key.clone(),
                hits: entry.access_count,
                size: entry.size,
            })
            .collect();

        CacheReport::build(&self.stats, self.entries.len(), keys)
    }

    /// Raw counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn test_store() -> CacheStore<String> {
        CacheStore::new(CacheConfig {
            ttl: Duration::from_secs(300),
            max_entries: 100,
            ..Default::default()
        })
    }

    #[test]
    fn test_store_new() {
        let store = test_store();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = test_store();

        store.set("key1", "value1".to_string(), SetOptions::default()).unwrap();

        assert_eq!(store.get("key1"), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = test_store();

        assert_eq!(store.get("nonexistent"), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = test_store();

        store.set("key1", "value1".to_string(), SetOptions::default()).unwrap();
        store.set("key1", "value2".to_string(), SetOptions::default()).unwrap();

        assert_eq!(store.get("key1"), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().sets, 2);
    }

    #[test]
    fn test_store_delete() {
        let mut store = test_store();

        store.set("key1", "value1".to_string(), SetOptions::default()).unwrap();

        assert!(store.delete("key1"));
        assert!(store.is_empty());
        assert_eq!(store.stats().deletes, 1);
    }

    #[test]
    fn test_store_delete_nonexistent_does_not_count() {
        let mut store = test_store();

        assert!(!store.delete("nonexistent"));
        assert_eq!(store.stats().deletes, 0);
    }

    #[test]
    fn test_store_ttl_expiration_is_lazy() {
        let mut store = test_store();

        store
            .set("key1", "value1".to_string(), SetOptions::with_ttl(Duration::from_millis(30)))
            .unwrap();

        assert!(store.get("key1").is_some());

        sleep(Duration::from_millis(60));

        // No sweep has run; the read itself must treat the entry as absent
        assert_eq!(store.get("key1"), None);
        assert_eq!(store.len(), 0);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_sliding_expiration_keeps_entry_alive() {
        let mut store = CacheStore::new(CacheConfig {
            ttl: Duration::from_millis(80),
            refresh_on_access: true,
            ..Default::default()
        });

        store.set("key1", "value1".to_string(), SetOptions::default()).unwrap();

        // Accesses spaced under the TTL keep refreshing the expiry
        for _ in 0..4 {
            sleep(Duration::from_millis(40));
            assert!(store.get("key1").is_some(), "entry expired despite refresh");
        }

        // Stop accessing for longer than the TTL
        sleep(Duration::from_millis(120));
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_no_refresh_uses_absolute_expiry() {
        let mut store = CacheStore::new(CacheConfig {
            ttl: Duration::from_millis(80),
            refresh_on_access: false,
            ..Default::default()
        });

        store.set("key1", "value1".to_string(), SetOptions::default()).unwrap();

        sleep(Duration::from_millis(50));
        assert!(store.get("key1").is_some());

        sleep(Duration::from_millis(50));
        assert_eq!(store.get("key1"), None, "access must not extend absolute expiry");
    }

    #[test]
    fn test_store_has_does_not_touch_stats() {
        let mut store = test_store();

        store.set("key1", "value1".to_string(), SetOptions::default()).unwrap();

        assert!(store.has("key1"));
        assert!(!store.has("other"));
        assert_eq!(store.stats().hits, 0);
        assert_eq!(store.stats().misses, 0);
    }

    #[test]
    fn test_store_has_removes_expired() {
        let mut store = test_store();

        store
            .set("key1", "value1".to_string(), SetOptions::with_ttl(Duration::from_millis(20)))
            .unwrap();
        sleep(Duration::from_millis(50));

        assert!(!store.has("key1"));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = CacheStore::new(CacheConfig {
            max_entries: 3,
            ..Default::default()
        });

        store.set("key1", "v1".to_string(), SetOptions::default()).unwrap();
        store.set("key2", "v2".to_string(), SetOptions::default()).unwrap();
        store.set("key3", "v3".to_string(), SetOptions::default()).unwrap();

        // At capacity; key4 evicts key1 (oldest access)
        store.set("key4", "v4".to_string(), SetOptions::default()).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("key1"), None);
        assert!(store.get("key2").is_some());
        assert!(store.get("key3").is_some());
        assert!(store.get("key4").is_some());
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = CacheStore::new(CacheConfig {
            max_entries: 3,
            ..Default::default()
        });

        store.set("key1", "v1".to_string(), SetOptions::default()).unwrap();
        store.set("key2", "v2".to_string(), SetOptions::default()).unwrap();
        store.set("key3", "v3".to_string(), SetOptions::default()).unwrap();

        // Reading key1 makes key2 the eviction candidate
        store.get("key1").unwrap();
        store.set("key4", "v4".to_string(), SetOptions::default()).unwrap();

        assert!(store.get("key1").is_some());
        assert_eq!(store.get("key2"), None);
    }

    #[test]
    fn test_store_overwrite_at_capacity_does_not_evict() {
        let mut store = CacheStore::new(CacheConfig {
            max_entries: 2,
            ..Default::default()
        });

        store.set("key1", "v1".to_string(), SetOptions::default()).unwrap();
        store.set("key2", "v2".to_string(), SetOptions::default()).unwrap();
        store.set("key1", "v1b".to_string(), SetOptions::default()).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 0);
        assert_eq!(store.get("key2"), Some("v2".to_string()));
    }

    #[test]
    fn test_store_clear_keeps_counters() {
        let mut store = test_store();

        store.set("key1", "v1".to_string(), SetOptions::default()).unwrap();
        store.get("key1").unwrap();
        let _ = store.get("missing");

        let cleared = store.clear();

        assert_eq!(cleared, 1);
        assert!(store.is_empty());
        assert_eq!(store.stats().hits, 1);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_clear_by_tags_intersection() {
        let mut store = test_store();

        store
            .set("a", "1".to_string(), SetOptions::with_tags(vec!["t".into(), "x".into()]))
            .unwrap();
        store
            .set("b", "2".to_string(), SetOptions::with_tags(vec!["x".into()]))
            .unwrap();
        store
            .set("c", "3".to_string(), SetOptions::with_tags(vec!["t".into()]))
            .unwrap();
        store.set("d", "4".to_string(), SetOptions::with_tags(vec![])).unwrap();

        let cleared = store.clear_by_tags(&["t".to_string()]);

        assert_eq!(cleared, 2);
        assert_eq!(store.get("a"), None);
        assert!(store.get("b").is_some());
        assert_eq!(store.get("c"), None);
        assert!(store.get("d").is_some());
    }

    #[test]
    fn test_store_instance_default_tags() {
        let mut store: CacheStore<String> = CacheStore::new(CacheConfig {
            tags: vec!["vehicles".to_string()],
            ..Default::default()
        });

        store.set("a", "1".to_string(), SetOptions::default()).unwrap();

        assert_eq!(store.clear_by_tags(&["vehicles".to_string()]), 1);
    }

    #[test]
    fn test_store_sweep_expired() {
        let mut store = test_store();

        store
            .set("soon", "v".to_string(), SetOptions::with_ttl(Duration::from_millis(20)))
            .unwrap();
        store
            .set("later", "v".to_string(), SetOptions::with_ttl(Duration::from_secs(60)))
            .unwrap();

        sleep(Duration::from_millis(50));

        assert_eq!(store.sweep_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("later").is_some());
    }

    #[test]
    fn test_store_remove_if_expired() {
        let mut store = test_store();

        store
            .set("soon", "v".to_string(), SetOptions::with_ttl(Duration::from_millis(20)))
            .unwrap();
        store.set("fresh", "v".to_string(), SetOptions::default()).unwrap();

        assert_eq!(store.remove_if_expired("fresh"), None);
        assert_eq!(store.remove_if_expired("missing"), None);

        sleep(Duration::from_millis(50));

        assert_eq!(store.remove_if_expired("soon"), Some("v".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_report() {
        let mut store = test_store();

        store.set("key1", "value1".to_string(), SetOptions::default()).unwrap();
        store.get("key1").unwrap();
        store.get("key1").unwrap();
        let _ = store.get("missing");

        let report = store.report();

        assert_eq!(report.total_entries, 1);
        assert_eq!(report.total_hits, 2);
        assert_eq!(report.total_misses, 1);
        assert_eq!(report.total_sets, 1);
        assert!(report.memory_usage > 0);
        assert_eq!(report.top_keys[0].key, "key1");
        assert_eq!(report.top_keys[0].hits, 2);
    }

    #[test]
    fn test_store_json_values() {
        let mut store: CacheStore<serde_json::Value> = CacheStore::new(CacheConfig::default());

        let payload = serde_json::json!({ "vehicles": [{ "id": 1, "plate": "BA-123" }] });
        store.set("vehicles:all", payload.clone(), SetOptions::default()).unwrap();

        assert_eq!(store.get("vehicles:all"), Some(payload));
    }
}
