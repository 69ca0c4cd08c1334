//! Path extractor for entity ids with a JSON rejection body.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pollen_core::{ensure_id, EntityId};

/// Extractor for a single entity id path parameter.
///
/// Unlike `Path<Uuid>`, a malformed or nil id is rejected with the same JSON
/// error shape the rest of the API uses.
///
/// ```rust,ignore
/// async fn get_environment(
///     State(state): State<AppState>,
///     PathId(environment_id): PathId,
/// ) -> ApiResult<Json<Environment>> { ... }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub EntityId);

/// Error returned when PathId extraction fails.
#[derive(Debug, thiserror::Error)]
#[error("Invalid id in path '{path}': {message}")]
pub struct PathIdError {
    pub path: String,
    pub message: String,
}

impl IntoResponse for PathIdError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": "invalid_path_parameter",
            "message": self.to_string(),
            "path_param": self.path,
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = PathIdError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<EntityId> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| PathIdError {
                path: parts.uri.path().to_string(),
                message: format!("Failed to extract UUID from path: {}", e),
            })?;

        let id = ensure_id(id, "path id").map_err(|e| PathIdError {
            path: parts.uri.path().to_string(),
            message: e.to_string(),
        })?;

        Ok(PathId(id))
    }
}
