//! Caller identity extractor.
//!
//! Authentication happens upstream. The gateway forwards the authenticated
//! user's id in the `x-user-id` header and the API trusts it as-is.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use pollen_core::{parse_id, EntityId};

use crate::error::ApiError;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user on whose behalf the request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub EntityId);

#[async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::unauthorized(format!("Missing {} header", USER_ID_HEADER)))?
            .to_str()
            .map_err(|_| ApiError::invalid_format(USER_ID_HEADER, "UUID"))?;

        let id = parse_id(raw, USER_ID_HEADER)?;
        Ok(CallerId(id))
    }
}
