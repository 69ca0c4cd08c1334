//! API Configuration Module
//!
//! Server address, storage backend selection, and CORS settings. Loaded
//! from environment variables with defaults suited to local development.

use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// STORAGE BACKEND
// ============================================================================

/// Which `AsyncStorage` implementation the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// In-process `MockStorage`; data is lost on restart.
    #[default]
    Memory,
    /// PostgreSQL via the pooled `DbClient`.
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mock" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" | "pg" => Ok(StorageBackend::Postgres),
            other => Err(format!("Invalid storage backend: {}", other)),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for binding, storage, and CORS.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind.
    pub bind_host: String,

    /// Port to bind.
    pub port: u16,

    /// Storage backend.
    pub storage: StorageBackend,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            storage: StorageBackend::Memory,
            cors_origins: Vec::new(), // Empty = allow all
            cors_max_age_secs: 86400, // 24 hours
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `POLLEN_API_BIND`: Interface to bind (default: 0.0.0.0)
    /// - `PORT` or `POLLEN_API_PORT`: Port (default: 3000)
    /// - `POLLEN_STORAGE`: "memory" or "postgres" (default: memory)
    /// - `POLLEN_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `POLLEN_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    ///
    /// # Errors
    /// Returns `InvalidInput` for an unparseable port or storage backend.
    pub fn from_env() -> ApiResult<Self> {
        let defaults = Self::default();

        let bind_host = std::env::var("POLLEN_API_BIND").unwrap_or(defaults.bind_host);

        let port = match std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("POLLEN_API_PORT").ok())
        {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", raw)))?,
            None => defaults.port,
        };

        let storage = match std::env::var("POLLEN_STORAGE").ok() {
            Some(raw) => raw.parse().map_err(ApiError::invalid_input)?,
            None => defaults.storage,
        };

        let cors_origins = std::env::var("POLLEN_CORS_ORIGINS")
            .ok()
            .map(|s| parse_origins(&s))
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("POLLEN_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        Ok(Self {
            bind_host,
            port,
            storage,
            cors_origins,
            cors_max_age_secs,
        })
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>().map_err(|e| {
            ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e))
        })
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            // Dev mode: allow all
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // Wildcard subdomains: *.pollen.app
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin.strip_prefix("https://") {
                    return origin_domain.ends_with(&format!(".{}", pattern));
                }
            }
            false
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}
