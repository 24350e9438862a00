//! HTTP Request Handlers Module
//!
//! The cache administration surface: statistics, full clear, targeted
//! entity invalidation and a health probe. Everything except the health
//! probe requires an elevated caller.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::info;

use crate::api::identity::CallerIdentity;
use crate::api::middleware::CacheContext;
use crate::error::{ApiError, Result};
use crate::models::{ClearResponse, HealthResponse, InvalidateResponse, StatsResponse};
use crate::registry::MutationAction;

// == App State ==
/// Shared state passed to every admin handler.
#[derive(Clone)]
pub struct AppState {
    pub ctx: CacheContext,
}

impl AppState {
    pub fn new(ctx: CacheContext) -> Self {
        Self { ctx }
    }
}

/// Admin endpoints are gated on an elevated role. A missing identity is
/// unauthenticated; a present but non-elevated one is forbidden.
fn require_elevated(identity: Option<&CallerIdentity>) -> Result<()> {
    match identity {
        None => Err(ApiError::Unauthorized),
        Some(identity) if !identity.role.is_elevated() => {
            Err(ApiError::Forbidden("admin role required".to_string()))
        }
        Some(_) => Ok(()),
    }
}

// == Stats Handler ==
/// GET /api/cache/stats - per-instance and aggregate statistics.
pub async fn stats_handler(
    State(state): State<AppState>,
    identity: Option<Extension<CallerIdentity>>,
) -> Result<Json<StatsResponse>> {
    require_elevated(identity.as_deref())?;

    let reports = state.ctx.registry.reports().await;
    Ok(Json(StatsResponse::new(reports)))
}

// == Clear Handler ==
/// POST /api/cache/clear - empties every cache instance.
pub async fn clear_handler(
    State(state): State<AppState>,
    identity: Option<Extension<CallerIdentity>>,
) -> Result<Json<ClearResponse>> {
    require_elevated(identity.as_deref())?;

    let cleared = state.ctx.registry.clear_all().await;
    info!(cleared, "admin cleared all caches");
    Ok(Json(ClearResponse::new(cleared)))
}

// == Invalidate Handler ==
/// POST /api/cache/invalidate/:key - runs the invalidation router for an
/// entity name. Unknown names succeed with zero entries cleared, so
/// callers can fire-and-forget.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    identity: Option<Extension<CallerIdentity>>,
    Path(key): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    require_elevated(identity.as_deref())?;

    // An admin-triggered invalidation has no specific write behind it;
    // treat it as an update, the broadest non-destructive action.
    let cleared = state
        .ctx
        .router
        .invalidate_named(&key, MutationAction::Update)
        .await;
    info!(entity = %key, cleared, "admin invalidated entity caches");
    Ok(Json(InvalidateResponse::new(key, cleared)))
}

// == Health Handler ==
/// GET /health - liveness probe, unauthenticated.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
