//! Cache Policy Module
//!
//! The framework-agnostic half of the request middleware: which requests
//! are cacheable, how cache keys are derived, which responses may be
//! stored and which mutation a write method implies. The axum binding in
//! `middleware.rs` is mechanical plumbing around these rules, so the
//! policy is defined and tested exactly once.

use std::time::Duration;

use axum::http::Method;

use crate::api::identity::{CallerIdentity, ANONYMOUS_SCOPE};
use crate::cache::SetOptions;
use crate::registry::{CacheName, MutationAction};

/// Response bodies above this size are served normally but not stored.
pub const MAX_CACHEABLE_BODY: usize = 1024 * 1024; // 1 MB

// == Key Scope ==
/// How a route's cache key incorporates the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    /// Key includes the caller identity; unauthenticated requests share
    /// an anonymous slot. The default: per-user data must never be
    /// cross-served.
    PerUser,
    /// One key for all callers. Only for responses identical for everyone.
    Shared,
}

// == Route Cache ==
/// Per-route caching policy, declared where the route is registered.
#[derive(Debug, Clone)]
pub struct RouteCache {
    /// Which registry instance backs this route
    pub name: CacheName,
    /// Key derivation strategy
    pub scope: KeyScope,
    /// Override of the instance default TTL
    pub ttl: Option<Duration>,
    /// Override of the instance default tags
    pub tags: Option<Vec<String>>,
    /// Per-route opt-out, leaving the handler untouched
    pub enabled: bool,
}

impl RouteCache {
    /// Per-user-keyed policy with instance defaults.
    pub fn per_user(name: CacheName) -> Self {
        Self {
            name,
            scope: KeyScope::PerUser,
            ttl: None,
            tags: None,
            enabled: true,
        }
    }

    /// Shared-key policy with instance defaults.
    pub fn shared(name: CacheName) -> Self {
        Self {
            scope: KeyScope::Shared,
            ..Self::per_user(name)
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Disables caching for the route while keeping its declaration in
    /// place.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// The per-set overrides this policy carries.
    pub fn set_options(&self) -> SetOptions {
        SetOptions {
            ttl: self.ttl,
            tags: self.tags.clone(),
        }
    }

    // == Key Derivation ==
    /// Default key: method + full path + query string + caller identity,
    /// with an anonymous marker when the request is unauthenticated.
    pub fn key_for(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
        identity: Option<&CallerIdentity>,
    ) -> String {
        let scope = match self.scope {
            KeyScope::Shared => "shared".to_string(),
            KeyScope::PerUser => identity
                .map(CallerIdentity::cache_scope)
                .unwrap_or_else(|| ANONYMOUS_SCOPE.to_string()),
        };

        match query {
            Some(query) => format!("{method}:{path}?{query}:{scope}"),
            None => format!("{method}:{path}:{scope}"),
        }
    }
}

// == Method Rules ==
/// Only safe, idempotent read methods go through the cache.
pub fn is_cacheable_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

/// Maps a mutating method to the invalidation action it implies.
/// Read methods map to none.
pub fn mutation_action(method: &Method) -> Option<MutationAction> {
    match *method {
        Method::POST => Some(MutationAction::Create),
        Method::PUT | Method::PATCH => Some(MutationAction::Update),
        Method::DELETE => Some(MutationAction::Delete),
        _ => None,
    }
}

// == Store Rules ==
/// Only successful responses are stored; errors always fall through to
/// the real handler on the next request.
pub fn should_store(status: u16) -> bool {
    (200..300).contains(&status)
}
