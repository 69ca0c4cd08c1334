//! Cache revalidation endpoint.
//!
//! Lets other processes that write the same tables drop stale reads here.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use pollen_storage::{CacheStats, MemoCache, TagScope, TagSelector};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RevalidateRequest {
    pub scope: TagScope,
    pub selector: TagSelector,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevalidateResponse {
    pub tags: Vec<String>,
    pub evicted: usize,
}

/// POST /api/v1/cache/revalidate
pub async fn revalidate(
    State(cache): State<Arc<MemoCache>>,
    Json(req): Json<RevalidateRequest>,
) -> ApiResult<Json<RevalidateResponse>> {
    if req.selector.is_empty() {
        return Err(ApiError::invalid_input(
            "selector must name at least one of id, user_id, organization_id, product_id",
        ));
    }

    let tags = req.selector.tags(req.scope);
    let evicted = cache.revalidate(&tags).await;
    info!(scope = ?req.scope, evicted, "Cache revalidated over HTTP");

    Ok(Json(RevalidateResponse {
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        evicted,
    }))
}

/// GET /api/v1/cache/stats
pub async fn stats(State(cache): State<Arc<MemoCache>>) -> Json<CacheStats> {
    Json(cache.stats().await)
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/cache/revalidate", post(revalidate))
        .route("/cache/stats", get(stats))
}
