//! Team REST API Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use pollen_core::{EntityId, TeamRole, TeamsOverview};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::extractors::{CallerId, PathId};
use crate::state::AppState;

// ============================================================================
// REQUEST/RESPONSE TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTeamRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTeamResponse {
    pub team_id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinTeamResponse {
    pub role: TeamRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveTeamResponse {
    pub left: bool,
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/organizations/:organization_id/teams
pub async fn list_teams(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    PathId(organization_id): PathId,
) -> ApiResult<Json<TeamsOverview>> {
    let overview = state.teams().get_teams(user_id, organization_id).await?;
    Ok(Json(overview))
}

/// POST /api/v1/organizations/:organization_id/teams
pub async fn create_team(
    State(state): State<AppState>,
    CallerId(_): CallerId,
    PathId(organization_id): PathId,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<impl IntoResponse> {
    let team_id = state.teams().create_team(organization_id, &req.name).await?;
    Ok((StatusCode::CREATED, Json(CreateTeamResponse { team_id })))
}

/// POST /api/v1/teams/:team_id/join
pub async fn join_team(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    PathId(team_id): PathId,
) -> ApiResult<Json<JoinTeamResponse>> {
    let role = state.teams().join_team(user_id, team_id).await?;
    Ok(Json(JoinTeamResponse { role }))
}

/// POST /api/v1/teams/:team_id/leave
pub async fn leave_team(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    PathId(team_id): PathId,
) -> ApiResult<Json<LeaveTeamResponse>> {
    let left = state.teams().leave_team(user_id, team_id).await?;
    Ok(Json(LeaveTeamResponse { left }))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/:organization_id/teams",
            get(list_teams).post(create_team),
        )
        .route("/teams/:team_id/join", post(join_team))
        .route("/teams/:team_id/leave", post(leave_team))
}
