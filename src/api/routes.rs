//! API Routes
//!
//! Configures the Axum router for the cache administration surface.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, health_handler, invalidate_handler, stats_handler, AppState,
};
use super::identity::identity_layer;

/// Creates the admin router.
///
/// # Endpoints
/// - `GET /api/cache/stats` - Per-instance and aggregate statistics
/// - `POST /api/cache/clear` - Empty every cache instance
/// - `POST /api/cache/invalidate/:key` - Run the invalidation router for an entity
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Identity: attaches the caller identity the admin gate checks
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/cache/stats", get(stats_handler))
        .route("/api/cache/clear", post(clear_handler))
        .route("/api/cache/invalidate/:key", post(invalidate_handler))
        .route("/health", get(health_handler))
        .layer(middleware::from_fn(identity_layer))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
