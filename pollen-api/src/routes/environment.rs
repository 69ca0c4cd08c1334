//! Environment REST API Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use pollen_core::{
    ActionClass, AttributeClass, EntityId, Environment, EnvironmentCreateInput,
    EnvironmentUpdateInput,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{CallerId, PathId};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionEnvironmentsResponse {
    pub environment_ids: Vec<EntityId>,
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/environments/:environment_id
pub async fn get_environment(
    State(state): State<AppState>,
    PathId(environment_id): PathId,
) -> ApiResult<Json<Environment>> {
    let environment = state
        .environments()
        .get_environment(environment_id)
        .await?
        .ok_or_else(|| ApiError::entity_not_found("Environment", environment_id))?;
    Ok(Json(environment))
}

/// PATCH /api/v1/environments/:environment_id
pub async fn update_environment(
    State(state): State<AppState>,
    PathId(environment_id): PathId,
    Json(patch): Json<EnvironmentUpdateInput>,
) -> ApiResult<Json<Environment>> {
    let environment = state
        .environments()
        .update_environment(environment_id, patch)
        .await?;
    Ok(Json(environment))
}

/// GET /api/v1/products/:product_id/environments
pub async fn list_environments(
    State(state): State<AppState>,
    PathId(product_id): PathId,
) -> ApiResult<Json<Vec<Environment>>> {
    let environments = state.environments().get_environments(product_id).await?;
    Ok(Json(environments))
}

/// POST /api/v1/products/:product_id/environments
pub async fn create_environment(
    State(state): State<AppState>,
    PathId(product_id): PathId,
    Json(input): Json<EnvironmentCreateInput>,
) -> ApiResult<impl IntoResponse> {
    let environment = state
        .environments()
        .create_environment(product_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(environment)))
}

/// GET /api/v1/environments/:environment_id/action-classes
pub async fn list_action_classes(
    State(state): State<AppState>,
    PathId(environment_id): PathId,
) -> ApiResult<Json<Vec<ActionClass>>> {
    let classes = state.environments().get_action_classes(environment_id).await?;
    Ok(Json(classes))
}

/// GET /api/v1/environments/:environment_id/attribute-classes
pub async fn list_attribute_classes(
    State(state): State<AppState>,
    PathId(environment_id): PathId,
) -> ApiResult<Json<Vec<AttributeClass>>> {
    let classes = state
        .environments()
        .get_attribute_classes(environment_id)
        .await?;
    Ok(Json(classes))
}

/// GET /api/v1/me/environments/first
pub async fn first_environment(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
) -> ApiResult<Json<Environment>> {
    let environment = state
        .environments()
        .get_first_environment_by_user_id(user_id)
        .await?;
    Ok(Json(environment))
}

/// GET /api/v1/me/environments/production
pub async fn production_environments(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
) -> ApiResult<Json<ProductionEnvironmentsResponse>> {
    let environment_ids = state
        .environments()
        .get_production_environment_ids_by_user_id(user_id)
        .await?;
    Ok(Json(ProductionEnvironmentsResponse { environment_ids }))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            "/environments/:environment_id",
            get(get_environment).patch(update_environment),
        )
        .route(
            "/environments/:environment_id/action-classes",
            get(list_action_classes),
        )
        .route(
            "/environments/:environment_id/attribute-classes",
            get(list_attribute_classes),
        )
        .route(
            "/products/:product_id/environments",
            get(list_environments).post(create_environment),
        )
        .route("/me/environments/first", get(first_environment))
        .route("/me/environments/production", get(production_environments))
}
