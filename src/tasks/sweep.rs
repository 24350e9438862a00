//! TTL Sweep Task
//!
//! Background task that periodically removes expired entries from every
//! registry instance. Expired entries are also dropped lazily on access;
//! the sweep only reclaims memory for keys nobody asks for again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::registry::CacheRegistry;

/// Spawns a background task that periodically sweeps expired entries from
/// every cache instance in the registry.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweep runs.
///
/// # Arguments
/// * `registry` - handle to the cache registry (clones share stores)
/// * `sweep_interval_secs` - Interval in seconds between sweep runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let registry = CacheRegistry::new(RegistryConfig::default());
/// let sweep_handle = spawn_sweep_task(registry.clone(), 60);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(registry: CacheRegistry, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting TTL sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = registry.sweep_expired().await;

            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}
