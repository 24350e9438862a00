//! Cache Registry Module
//!
//! A fixed set of named response-cache instances, one per domain entity.
//! The registry is constructed explicitly at startup and injected into
//! route registration, so tests can build a fresh one per case.

use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::cache::{CacheConfig, CacheReport, CacheService};
use crate::models::CachedResponse;

/// A named cache instance storing captured HTTP responses.
pub type ResponseCache = CacheService<CachedResponse>;

// == Cache Name ==
/// The six registry instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheName {
    Companies,
    Vehicles,
    Customers,
    Expenses,
    Rentals,
    Statistics,
}

impl CacheName {
    /// Every instance, in stats-report order.
    pub const ALL: [CacheName; 6] = [
        CacheName::Companies,
        CacheName::Vehicles,
        CacheName::Customers,
        CacheName::Expenses,
        CacheName::Rentals,
        CacheName::Statistics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheName::Companies => "companies",
            CacheName::Vehicles => "vehicles",
            CacheName::Customers => "customers",
            CacheName::Expenses => "expenses",
            CacheName::Rentals => "rentals",
            CacheName::Statistics => "statistics",
        }
    }
}

// == Registry Config ==
/// Per-instance configuration for the whole registry.
///
/// Defaults encode how often each entity type changes: near-static
/// companies keep entries for half an hour, while derived statistics go
/// stale within a minute. The relative ordering of these TTLs is part of
/// the design; the exact numbers are tuning.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub companies: CacheConfig,
    pub vehicles: CacheConfig,
    pub customers: CacheConfig,
    pub expenses: CacheConfig,
    pub rentals: CacheConfig,
    pub statistics: CacheConfig,
}

fn instance_config(name: CacheName, ttl: Duration, max_entries: usize) -> CacheConfig {
    CacheConfig {
        ttl,
        max_entries,
        tags: vec![name.as_str().to_string()],
        refresh_on_access: true,
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            // Companies rarely change
            companies: instance_config(CacheName::Companies, Duration::from_secs(30 * 60), 100),
            // Vehicles change infrequently
            vehicles: instance_config(CacheName::Vehicles, Duration::from_secs(10 * 60), 500),
            // Customers see moderate churn
            customers: instance_config(CacheName::Customers, Duration::from_secs(5 * 60), 1000),
            expenses: instance_config(CacheName::Expenses, Duration::from_secs(5 * 60), 1000),
            // Rentals change frequently
            rentals: instance_config(CacheName::Rentals, Duration::from_secs(2 * 60), 2000),
            // Statistics derive from everything else and must stay fresh
            statistics: instance_config(CacheName::Statistics, Duration::from_secs(60), 50),
        }
    }
}

// == Cache Registry ==
/// The process-wide set of named cache instances.
///
/// Each instance is exclusively owned here; all interaction goes through
/// the [`ResponseCache`] operations. Cloning the registry clones handles,
/// not stores.
#[derive(Clone)]
pub struct CacheRegistry {
    companies: ResponseCache,
    vehicles: ResponseCache,
    customers: ResponseCache,
    expenses: ResponseCache,
    rentals: ResponseCache,
    statistics: ResponseCache,
}

impl CacheRegistry {
    // == Constructor ==
    /// Builds all six instances from the given configuration.
    pub fn new(config: RegistryConfig) -> Self {
        info!("cache registry initialized");
        Self {
            companies: CacheService::new(CacheName::Companies.as_str(), config.companies),
            vehicles: CacheService::new(CacheName::Vehicles.as_str(), config.vehicles),
            customers: CacheService::new(CacheName::Customers.as_str(), config.customers),
            expenses: CacheService::new(CacheName::Expenses.as_str(), config.expenses),
            rentals: CacheService::new(CacheName::Rentals.as_str(), config.rentals),
            statistics: CacheService::new(CacheName::Statistics.as_str(), config.statistics),
        }
    }

    // == Lookup ==
    /// The instance registered under `name`.
    pub fn cache(&self, name: CacheName) -> &ResponseCache {
        match name {
            CacheName::Companies => &self.companies,
            CacheName::Vehicles => &self.vehicles,
            CacheName::Customers => &self.customers,
            CacheName::Expenses => &self.expenses,
            CacheName::Rentals => &self.rentals,
            CacheName::Statistics => &self.statistics,
        }
    }

    /// Iterates every instance with its name.
    pub fn iter(&self) -> impl Iterator<Item = (CacheName, &ResponseCache)> {
        CacheName::ALL.into_iter().map(|name| (name, self.cache(name)))
    }

    // == Clear All ==
    /// Empties every instance; returns total entries removed. Counters
    /// survive, matching `clear` on a single instance.
    pub async fn clear_all(&self) -> usize {
        let mut cleared = 0;
        for (_, cache) in self.iter() {
            cleared += cache.clear().await;
        }
        info!(cleared, "all caches cleared");
        cleared
    }

    // == Sweep Expired ==
    /// Removes already-expired entries from every instance; returns the
    /// total removed.
    pub async fn sweep_expired(&self) -> usize {
        let mut removed = 0;
        for (_, cache) in self.iter() {
            removed += cache.sweep_expired().await;
        }
        removed
    }

    // == Reports ==
    /// Statistics snapshot for every instance.
    pub async fn reports(&self) -> Vec<(&'static str, CacheReport)> {
        let mut reports = Vec::with_capacity(CacheName::ALL.len());
        for (name, cache) in self.iter() {
            reports.push((name.as_str(), cache.report().await));
        }
        reports
    }
}
