//! Invalidation Router Module
//!
//! Maps a domain-entity mutation to the set of caches that must be
//! cleared. The fan-out is intentionally coarse-grained: whole instances
//! are cleared rather than individual keys, trading extra misses after a
//! write for the certainty of never under-invalidating a dependent key.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::registry::instances::{CacheName, CacheRegistry};

// == Entity ==
/// A domain entity whose mutation triggers invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Rental,
    Vehicle,
    Customer,
    Expense,
    Company,
    /// A vehicle being blocked or unblocked (maintenance and the like);
    /// availability and calendar views derive from it.
    Unavailability,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Rental => "rental",
            Entity::Vehicle => "vehicle",
            Entity::Customer => "customer",
            Entity::Expense => "expense",
            Entity::Company => "company",
            Entity::Unavailability => "unavailability",
        }
    }
}

impl FromStr for Entity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rental" => Ok(Entity::Rental),
            "vehicle" => Ok(Entity::Vehicle),
            "customer" => Ok(Entity::Customer),
            "expense" => Ok(Entity::Expense),
            "company" => Ok(Entity::Company),
            "unavailability" => Ok(Entity::Unavailability),
            _ => Err(()),
        }
    }
}

// == Mutation Action ==
/// The kind of write that happened to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationAction {
    Create,
    Update,
    Delete,
}

impl MutationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationAction::Create => "create",
            MutationAction::Update => "update",
            MutationAction::Delete => "delete",
        }
    }
}

// == Calendar Cache Invalidator ==
/// Capability owned by the persistence layer: an externally maintained
/// calendar/availability cache the router pokes best-effort during
/// unavailability invalidation. Failures are logged, never propagated.
pub trait CalendarCacheInvalidator: Send + Sync {
    fn invalidate_calendar(&self) -> anyhow::Result<()>;
}

// == Invalidation Router ==
/// Translates entity mutations into cache clears.
#[derive(Clone)]
pub struct InvalidationRouter {
    registry: CacheRegistry,
    calendar: Option<Arc<dyn CalendarCacheInvalidator>>,
}

impl InvalidationRouter {
    pub fn new(registry: CacheRegistry) -> Self {
        Self {
            registry,
            calendar: None,
        }
    }

    /// Injects the persistence layer's calendar cache capability.
    pub fn with_calendar_invalidator(mut self, calendar: Arc<dyn CalendarCacheInvalidator>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    // == Invalidate ==
    /// Clears every cache affected by the given mutation.
    ///
    /// Returns the total number of entries removed.
    pub async fn invalidate(&self, entity: Entity, action: MutationAction) -> usize {
        let cleared = match entity {
            Entity::Rental => {
                // Rentals do not redefine vehicle/customer identity
                self.clear_many(&[CacheName::Rentals, CacheName::Statistics]).await
            }
            Entity::Vehicle => {
                let mut cleared = self
                    .clear_many(&[CacheName::Vehicles, CacheName::Statistics])
                    .await;
                // Vehicle edits can affect availability views embedded in
                // rental data
                if action == MutationAction::Update {
                    cleared += self.registry.cache(CacheName::Rentals).clear().await;
                }
                cleared
            }
            Entity::Customer => {
                self.clear_many(&[CacheName::Customers, CacheName::Statistics]).await
            }
            Entity::Expense => {
                self.clear_many(&[CacheName::Expenses, CacheName::Statistics]).await
            }
            // Company identity is referenced transitively by everything
            Entity::Company => self.registry.clear_all().await,
            Entity::Unavailability => {
                let cleared = self
                    .clear_many(&[
                        CacheName::Rentals,
                        CacheName::Vehicles,
                        CacheName::Statistics,
                    ])
                    .await;
                self.poke_calendar_cache();
                cleared
            }
        };

        info!(
            entity = entity.as_str(),
            action = action.as_str(),
            cleared,
            "cache invalidated"
        );
        cleared
    }

    // == Invalidate By Name ==
    /// Runs the router for an arbitrary entity name (the admin endpoint
    /// accepts any string). An unknown name is a logged no-op.
    pub async fn invalidate_named(&self, name: &str, action: MutationAction) -> usize {
        match name.parse::<Entity>() {
            Ok(entity) => self.invalidate(entity, action).await,
            Err(()) => {
                debug!(entity = name, "no invalidation rule for entity, skipping");
                0
            }
        }
    }

    async fn clear_many(&self, names: &[CacheName]) -> usize {
        let mut cleared = 0;
        for name in names {
            cleared += self.registry.cache(*name).clear().await;
        }
        cleared
    }

    /// Best-effort side call into the externally owned calendar cache.
    fn poke_calendar_cache(&self) {
        if let Some(calendar) = &self.calendar {
            match calendar.invalidate_calendar() {
                Ok(()) => debug!("calendar cache invalidated"),
                Err(err) => warn!(%err, "failed to invalidate calendar cache"),
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SetOptions;
    use crate::models::CachedResponse;
    use crate::registry::instances::RegistryConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cached() -> CachedResponse {
        CachedResponse::new(200, None, b"{}".to_vec())
    }

    async fn populated_registry() -> CacheRegistry {
        let registry = CacheRegistry::new(RegistryConfig::default());
        for (name, cache) in registry.iter() {
            cache.set(name.as_str(), cached(), SetOptions::default()).await;
        }
        registry
    }

    async fn entry_counts(registry: &CacheRegistry) -> Vec<(&'static str, usize)> {
        let mut counts = Vec::new();
        for (name, cache) in registry.iter() {
            counts.push((name.as_str(), cache.len().await));
        }
        counts
    }

    #[test]
    fn test_entity_parsing() {
        assert_eq!("rental".parse::<Entity>(), Ok(Entity::Rental));
        assert_eq!("unavailability".parse::<Entity>(), Ok(Entity::Unavailability));
        assert!("spaceship".parse::<Entity>().is_err());
    }

    #[tokio::test]
    async fn test_rental_mutation_clears_rentals_and_statistics() {
        let registry = populated_registry().await;
        let router = InvalidationRouter::new(registry.clone());

        let cleared = router.invalidate(Entity::Rental, MutationAction::Update).await;

        assert_eq!(cleared, 2);
        for (name, count) in entry_counts(&registry).await {
            match name {
                "rentals" | "statistics" => assert_eq!(count, 0, "{name} should be empty"),
                _ => assert_eq!(count, 1, "{name} must be untouched"),
            }
        }
    }

    #[tokio::test]
    async fn test_vehicle_update_also_clears_rentals() {
        let registry = populated_registry().await;
        let router = InvalidationRouter::new(registry.clone());

        router.invalidate(Entity::Vehicle, MutationAction::Update).await;

        for (name, count) in entry_counts(&registry).await {
            match name {
                "vehicles" | "statistics" | "rentals" => assert_eq!(count, 0),
                _ => assert_eq!(count, 1),
            }
        }
    }

    #[tokio::test]
    async fn test_vehicle_create_leaves_rentals() {
        let registry = populated_registry().await;
        let router = InvalidationRouter::new(registry.clone());

        router.invalidate(Entity::Vehicle, MutationAction::Create).await;

        for (name, count) in entry_counts(&registry).await {
            match name {
                "vehicles" | "statistics" => assert_eq!(count, 0),
                _ => assert_eq!(count, 1, "{name} must be untouched"),
            }
        }
    }

    #[tokio::test]
    async fn test_company_mutation_clears_everything() {
        let registry = populated_registry().await;
        let router = InvalidationRouter::new(registry.clone());

        let cleared = router.invalidate(Entity::Company, MutationAction::Create).await;

        assert_eq!(cleared, 6);
        for (name, count) in entry_counts(&registry).await {
            assert_eq!(count, 0, "{name} should be empty");
        }
    }

    #[tokio::test]
    async fn test_customer_and_expense_fanout() {
        for (entity, expected_empty) in [
            (Entity::Customer, "customers"),
            (Entity::Expense, "expenses"),
        ] {
            let registry = populated_registry().await;
            let router = InvalidationRouter::new(registry.clone());

            router.invalidate(entity, MutationAction::Delete).await;

            for (name, count) in entry_counts(&registry).await {
                if name == expected_empty || name == "statistics" {
                    assert_eq!(count, 0, "{name} should be empty");
                } else {
                    assert_eq!(count, 1, "{name} must be untouched");
                }
            }
        }
    }

    struct CountingCalendar {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CalendarCacheInvalidator for CountingCalendar {
        fn invalidate_calendar(&self) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("calendar backend unreachable")
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_unavailability_pokes_calendar_cache() {
        let registry = populated_registry().await;
        let calendar = Arc::new(CountingCalendar {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let router = InvalidationRouter::new(registry.clone())
            .with_calendar_invalidator(calendar.clone());

        router.invalidate(Entity::Unavailability, MutationAction::Create).await;

        assert_eq!(calendar.calls.load(Ordering::SeqCst), 1);
        for (name, count) in entry_counts(&registry).await {
            match name {
                "rentals" | "vehicles" | "statistics" => assert_eq!(count, 0),
                _ => assert_eq!(count, 1),
            }
        }
    }

    #[tokio::test]
    async fn test_calendar_failure_does_not_fail_invalidation() {
        let registry = populated_registry().await;
        let calendar = Arc::new(CountingCalendar {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let router = InvalidationRouter::new(registry.clone())
            .with_calendar_invalidator(calendar.clone());

        let cleared = router
            .invalidate(Entity::Unavailability, MutationAction::Update)
            .await;

        assert_eq!(calendar.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cleared, 3, "caches must still be cleared when the side call fails");
    }

    #[tokio::test]
    async fn test_invalidate_named_unknown_entity_is_noop() {
        let registry = populated_registry().await;
        let router = InvalidationRouter::new(registry.clone());

        let cleared = router.invalidate_named("spaceship", MutationAction::Update).await;

        assert_eq!(cleared, 0);
        for (_, count) in entry_counts(&registry).await {
            assert_eq!(count, 1);
        }
    }

    #[tokio::test]
    async fn test_invalidate_named_known_entity() {
        let registry = populated_registry().await;
        let router = InvalidationRouter::new(registry.clone());

        let cleared = router.invalidate_named("rental", MutationAction::Update).await;
        assert_eq!(cleared, 2);
    }
}
