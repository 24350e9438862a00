//! Cache Middleware Module
//!
//! The axum binding of the cache policy: a read-through layer that serves
//! stored responses without running the handler, and a write layer that
//! fires the invalidation router after successful mutations. Responses
//! are byte-identical whether served from cache or freshly computed; the
//! only observable difference is the `x-cache` diagnostic header.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::api::identity::CallerIdentity;
use crate::api::policy::{self, RouteCache, MAX_CACHEABLE_BODY};
use crate::error::ApiError;
use crate::models::CachedResponse;
use crate::registry::{CacheRegistry, Entity, InvalidationRouter};

/// Diagnostic header distinguishing cache hits from misses.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

// == Cache Context ==
/// Everything the middleware needs, injected at route registration.
#[derive(Clone)]
pub struct CacheContext {
    pub registry: CacheRegistry,
    pub router: InvalidationRouter,
}

impl CacheContext {
    pub fn new(registry: CacheRegistry) -> Self {
        let router = InvalidationRouter::new(registry.clone());
        Self { registry, router }
    }

    /// Uses a router carrying extra collaborators (calendar invalidator).
    pub fn with_router(registry: CacheRegistry, router: InvalidationRouter) -> Self {
        Self { registry, router }
    }
}

// == Read Through ==
/// Layer for idempotent read routes, applied per route with its
/// [`RouteCache`] policy:
///
/// ```ignore
/// .route_layer(middleware::from_fn_with_state(
///     (ctx.clone(), RouteCache::per_user(CacheName::Vehicles)),
///     read_through,
/// ))
/// ```
///
/// On hit the handler never runs. On miss the handler's 2xx body is
/// captured byte-exact and stored under the derived key; non-2xx
/// responses and oversized bodies pass through unstored.
pub async fn read_through(
    State((ctx, route)): State<(CacheContext, RouteCache)>,
    req: Request,
    next: Next,
) -> Response {
    if !route.enabled || !policy::is_cacheable_method(req.method()) {
        return next.run(req).await;
    }

    let identity = req.extensions().get::<CallerIdentity>().cloned();
    let key = route.key_for(
        req.method(),
        req.uri().path(),
        req.uri().query(),
        identity.as_ref(),
    );

    let cache = ctx.registry.cache(route.name);
    if let Some(cached) = cache.get(&key).await {
        debug!(cache = route.name.as_str(), key = %key, "serving cached response");
        return serve_cached(cached);
    }

    let response = next.run(req).await;
    let status = response.status();
    if !policy::should_store(status.as_u16()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(key = %key, %err, "failed to buffer response body");
            return ApiError::Internal("failed to buffer response body".to_string())
                .into_response();
        }
    };

    if bytes.len() <= MAX_CACHEABLE_BODY {
        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        cache
            .set(
                &key,
                CachedResponse::new(status.as_u16(), content_type, bytes.to_vec()),
                route.set_options(),
            )
            .await;
    } else {
        debug!(key = %key, size = bytes.len(), "response too large to cache");
    }

    parts.headers.insert(
        HeaderName::from_static(CACHE_STATUS_HEADER),
        HeaderValue::from_static("MISS"),
    );
    Response::from_parts(parts, Body::from(bytes))
}

/// Replays a stored response exactly as the handler produced it.
fn serve_cached(cached: CachedResponse) -> Response {
    let mut builder = Response::builder()
        .status(cached.status)
        .header(HeaderName::from_static(CACHE_STATUS_HEADER), "HIT");

    if let Some(content_type) = &cached.content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }

    match builder.body(Body::from(cached.body)) {
        Ok(response) => response,
        Err(err) => {
            warn!(%err, "failed to rebuild cached response");
            ApiError::Internal("failed to rebuild cached response".to_string()).into_response()
        }
    }
}

// == Invalidate On Write ==
/// Layer for mutating routes. The handler always runs; a 2xx response
/// triggers the invalidation router for the route's declared entity, with
/// the action derived from the method (POST creates, PUT/PATCH update,
/// DELETE deletes). Write responses are never cached.
pub async fn invalidate_on_write(
    State((ctx, entity)): State<(CacheContext, Entity)>,
    req: Request,
    next: Next,
) -> Response {
    let action = match policy::mutation_action(req.method()) {
        Some(action) => action,
        None => return next.run(req).await,
    };

    let response = next.run(req).await;

    if response.status().is_success() {
        ctx.router.invalidate(entity, action).await;
    }

    response
}
