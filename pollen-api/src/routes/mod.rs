//! REST API Routes Module
//!
//! Route handlers organized by resource, plus the router assembly:
//! - Health check endpoints (no caller identity)
//! - Team listing, creation, join and leave
//! - Environment CRUD and per-user environment resolution
//! - Cache revalidation for other writers
//! - CORS support for the browser editor

pub mod cache;
pub mod environment;
pub mod health;
pub mod team;

use std::future::Future;
use std::time::Duration;

use axum::{
    http::{header, header::HeaderName, Method},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::extractors::USER_ID_HEADER;
use crate::state::AppState;

// Re-export route creation functions for convenience
pub use cache::create_router as cache_router;
pub use environment::create_router as environment_router;
pub use health::create_router as health_router;
pub use team::create_router as team_router;

/// Build the CORS layer from ApiConfig.
///
/// In development mode (empty origins), allows all origins.
/// In production mode, only origins accepted by
/// [`ApiConfig::is_origin_allowed`], which understands `*.domain` entries.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(USER_ID_HEADER),
        ])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(
            "CORS: Production mode - allowing origins: {:?}",
            config.cors_origins
        );
        let config = config.clone();
        cors.allow_origin(AllowOrigin::predicate(move |origin, _parts| {
            origin
                .to_str()
                .is_ok_and(|origin| config.is_origin_allowed(origin))
        }))
    }
}

/// Routes mounted under `/api/v1`.
fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(team_router())
        .merge(environment_router())
        .merge(cache_router())
}

/// Create the complete API router.
///
/// Layers:
/// - HTTP tracing
/// - CORS layer
pub fn create_api_router(state: AppState, api_config: &ApiConfig) -> Router {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(api_config))
        .with_state(state)
}

/// Serve `app` until `shutdown` resolves, then stop accepting connections
/// and let requests already in flight complete.
pub async fn serve<F>(listener: tokio::net::TcpListener, app: Router, shutdown: F) -> ApiResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))
}
