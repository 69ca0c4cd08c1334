//! Memoizable value marker and cache statistics.

use serde::{de::DeserializeOwned, Serialize};

/// Marker trait for values that can be memoized.
///
/// Values are stored as JSON, so anything that round-trips through serde
/// qualifies.
pub trait Memoizable: Serialize + DeserializeOwned + Send + 'static {}

impl<T> Memoizable for T where T: Serialize + DeserializeOwned + Send + 'static {}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses (including every call while disabled).
    pub misses: u64,
    /// Number of tags revalidated.
    pub invalidations: u64,
    /// Number of evictions due to capacity.
    pub evictions: u64,
    /// Number of entries currently in cache.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
