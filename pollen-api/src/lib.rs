//! Pollen API - Services and REST Layer
//!
//! Team membership and environment services over the `AsyncStorage` trait,
//! with reads memoized in a tag-invalidated cache, exposed as an Axum REST
//! API. Storage is either the in-process `MockStorage` or PostgreSQL through
//! a deadpool connection pool.

mod macros;

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::{ApiConfig, StorageBackend};
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::{create_api_router, serve};
pub use services::{EnvironmentService, OrganizationService, TeamService};
pub use state::AppState;
