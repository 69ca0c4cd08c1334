//! Shared application state for Axum routers.

use std::sync::Arc;

use pollen_storage::{AsyncStorage, CacheConfig, MemoCache};

use crate::services::{EnvironmentService, OrganizationService, TeamService};

/// Shared storage handle used by every service.
pub type SharedStorage = Arc<dyn AsyncStorage>;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend (in-memory or Postgres).
    pub storage: SharedStorage,
    /// Process-wide memo cache. Every service reads through it.
    pub cache: Arc<MemoCache>,
    /// Process start, reported as uptime by the readiness check.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(storage: SharedStorage, cache_config: CacheConfig) -> Self {
        Self {
            storage,
            cache: Arc::new(MemoCache::new(cache_config)),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn teams(&self) -> TeamService {
        TeamService::new(self.storage.clone(), self.cache.clone())
    }

    pub fn environments(&self) -> EnvironmentService {
        EnvironmentService::new(self.storage.clone(), self.cache.clone())
    }

    pub fn organizations(&self) -> OrganizationService {
        OrganizationService::new(self.storage.clone(), self.cache.clone())
    }
}

// Substates for handlers that need a single piece of the state.
crate::impl_from_ref!(SharedStorage, storage);
crate::impl_from_ref!(Arc<MemoCache>, cache);
crate::impl_from_ref!(std::time::Instant, start_time);
