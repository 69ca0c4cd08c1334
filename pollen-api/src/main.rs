//! Pollen API Server Entry Point
//!
//! Bootstraps configuration, selects the storage backend, and starts the
//! Axum HTTP server.

use std::sync::Arc;

use axum::Router;
use pollen_api::telemetry::{init_tracer, TelemetryConfig};
use pollen_api::{
    create_api_router, serve, ApiConfig, ApiError, ApiResult, AppState, DbClient, DbConfig,
    StorageBackend,
};
use pollen_storage::{AsyncStorage, CacheConfig, MockStorage};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::from_env();
    init_tracer(&telemetry_config)?;

    let api_config = ApiConfig::from_env()?;
    let cache_config = CacheConfig::from_env();

    let storage: Arc<dyn AsyncStorage> = match api_config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Arc::new(MockStorage::new())
        }
        StorageBackend::Postgres => {
            let db_config = DbConfig::from_env();
            tracing::info!(host = %db_config.host, dbname = %db_config.dbname, "Using PostgreSQL storage");
            Arc::new(DbClient::from_config(&db_config)?)
        }
    };

    let state = AppState::new(storage, cache_config);
    let app: Router = create_api_router(state, &api_config);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting Pollen API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    serve(listener, app, shutdown_signal()).await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on ctrl-c. In-flight requests finish before `serve` returns.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, draining connections"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for ctrl-c, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
