//! Cache Service Module
//!
//! Async handle over a [`CacheStore`], shared between request handlers,
//! middleware and background tasks. Adds the cache-aside helper
//! (`get_or_set`), best-effort warming and optional one-shot expiry
//! callbacks on top of the synchronous engine.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::config::{CacheConfig, SetOptions};
use crate::cache::stats::CacheReport;
use crate::cache::store::CacheStore;

/// Callback invoked when a one-shot expiry timer fires for an entry.
pub type ExpireCallback<T> = Arc<dyn Fn(&str, &T) + Send + Sync>;

// == Cache Service ==
/// Cheaply cloneable, thread-safe cache handle.
///
/// All clones share one underlying store behind a `tokio` RwLock, so
/// individual operations are atomic with respect to each other.
pub struct CacheService<T> {
    /// Instance name, used for logging and reports
    name: String,
    /// The shared engine
    store: Arc<RwLock<CacheStore<T>>>,
    /// Optional callback wired to a per-set expiry timer
    on_expire: Option<ExpireCallback<T>>,
}

impl<T> Clone for CacheService<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            store: Arc::clone(&self.store),
            on_expire: self.on_expire.clone(),
        }
    }
}

impl<T> CacheService<T>
where
    T: Clone + Serialize + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a named cache instance from the given configuration.
    pub fn new(name: impl Into<String>, config: CacheConfig) -> Self {
        Self {
            name: name.into(),
            store: Arc::new(RwLock::new(CacheStore::new(config))),
            on_expire: None,
        }
    }

    /// Registers a callback fired by a one-shot timer when an entry's
    /// scheduled expiry passes. This is in addition to, and independent
    /// of, the lazy-expiry check done on access.
    pub fn with_on_expire(mut self, callback: ExpireCallback<T>) -> Self {
        self.on_expire = Some(callback);
        self
    }

    /// Instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // == Set ==
    /// Stores or overwrites an entry, failing soft: a value that cannot
    /// be serialized for sizing is logged and simply not cached.
    pub async fn set(&self, key: &str, value: T, options: SetOptions) {
        let ttl = options.ttl;
        let stored = {
            let mut store = self.store.write().await;
            let effective_ttl = ttl.unwrap_or(store.config().ttl);
            match store.set(key, value, options) {
                Ok(()) => Some(effective_ttl),
                Err(err) => {
                    warn!(cache = %self.name, key, %err, "value not cached: serialization failed");
                    None
                }
            }
        };

        if let (Some(ttl), Some(callback)) = (stored, self.on_expire.clone()) {
            self.spawn_expiry_timer(key.to_string(), ttl, callback);
        }
    }

    // == Get ==
    /// Returns the cached value, or `None` on miss (absent or expired).
    pub async fn get(&self, key: &str) -> Option<T> {
        self.store.write().await.get(key)
    }

    // == Has ==
    /// Existence check without touching hit/miss counters.
    pub async fn has(&self, key: &str) -> bool {
        self.store.write().await.has(key)
    }

    // == Delete ==
    /// Removes an entry; returns whether it existed.
    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    // == Clear ==
    /// Removes all entries; returns the count removed.
    pub async fn clear(&self) -> usize {
        let cleared = self.store.write().await.clear();
        if cleared > 0 {
            info!(cache = %self.name, cleared, "cache cleared");
        }
        cleared
    }

    // == Clear By Tags ==
    /// Removes every entry tagged with any of `tags`; returns the count.
    pub async fn clear_by_tags(&self, tags: &[String]) -> usize {
        let cleared = self.store.write().await.clear_by_tags(tags);
        if cleared > 0 {
            info!(cache = %self.name, ?tags, cleared, "cache cleared by tags");
        }
        cleared
    }

    // == Get Or Set ==
    /// Cache-aside helper: returns the cached value if present, otherwise
    /// runs `fetch`, stores the result and returns it.
    ///
    /// A fetch error propagates unchanged and nothing is stored. There is
    /// no in-flight de-duplication: concurrent misses for the same key may
    /// each invoke `fetch` independently.
    pub async fn get_or_set<F, Fut, E>(
        &self,
        key: &str,
        options: SetOptions,
        fetch: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get(key).await {
            return Ok(cached);
        }

        // Lock is not held across the fetch await
        let value = fetch().await?;
        self.set(key, value.clone(), options).await;
        Ok(value)
    }

    // == Warm ==
    /// Best-effort bulk populate: runs `loader` for every key, storing
    /// successes with instance defaults. Individual failures are logged
    /// and do not abort the batch. Returns the number of keys loaded.
    pub async fn warm<F, Fut, E>(&self, keys: &[String], loader: F) -> usize
    where
        F: Fn(&str) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut successful = 0;

        for key in keys {
            match loader(key).await {
                Ok(value) => {
                    self.set(key, value, SetOptions::default()).await;
                    successful += 1;
                }
                Err(err) => {
                    warn!(cache = %self.name, key = %key, %err, "cache warming failed for key");
                }
            }
        }

        info!(
            cache = %self.name,
            successful,
            total = keys.len(),
            "cache warmed"
        );
        successful
    }

    // == Sweep Expired ==
    /// Removes all already-expired entries; returns the count removed.
    pub async fn sweep_expired(&self) -> usize {
        self.store.write().await.sweep_expired()
    }

    // == Report ==
    /// Point-in-time statistics snapshot.
    pub async fn report(&self) -> CacheReport {
        self.store.read().await.report()
    }

    // == Length ==
    /// Current number of entries.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Returns true if the instance holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// One-shot timer mirroring the entry's scheduled expiry. The timer
    /// only removes the entry if it is genuinely expired when it fires;
    /// a refreshed or overwritten entry is left alone.
    fn spawn_expiry_timer(&self, key: String, ttl: std::time::Duration, callback: ExpireCallback<T>) {
        let store = Arc::clone(&self.store);
        let name = self.name.clone();

        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let removed = store.write().await.remove_if_expired(&key);
            if let Some(value) = removed {
                debug!(cache = %name, key = %key, "expiry timer removed entry");
                callback(&key, &value);
            }
        });
    }
}
