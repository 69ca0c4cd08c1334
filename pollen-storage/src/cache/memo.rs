//! Tag-invalidated memo cache.
//!
//! Reads are memoized under a `CacheKey` and indexed under one or more
//! `CacheTag`s. Mutations revalidate tags, which evicts every entry indexed
//! under them and advances their watermarks so in-flight computations that
//! started before the revalidation cannot store their (stale) results.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use pollen_core::{PollenError, PollenResult};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::tags::{CacheKey, CacheTag, TagScope, TagSelector};
use super::traits::{CacheStats, Memoizable};
use super::watermark::{TagWatermarks, WatermarkSnapshot};

/// Configuration for the memo cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// When false every read computes and nothing is stored.
    pub enabled: bool,
    /// TTL for cached entries (even if no tag was revalidated).
    pub entry_ttl: Duration,
    /// Maximum number of entries; the oldest is evicted beyond this.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            entry_ttl: Duration::from_secs(3600), // 1 hour
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config with caching turned off.
    pub fn disabled() -> Self {
        Self::default().with_enabled(false)
    }

    /// Enable or disable caching.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = ttl;
        self
    }

    /// Set the max entries.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Create CacheConfig from environment variables.
    ///
    /// Environment variables:
    /// - `POLLEN_CACHE_ENABLED`: "true" or "false" (default: true)
    /// - `POLLEN_CACHE_TTL_SECS`: Entry TTL in seconds (default: 3600)
    /// - `POLLEN_CACHE_MAX_ENTRIES`: Entry capacity (default: 10000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let enabled = std::env::var("POLLEN_CACHE_ENABLED")
            .ok()
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(defaults.enabled);

        let entry_ttl = std::env::var("POLLEN_CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.entry_ttl);

        let max_entries = std::env::var("POLLEN_CACHE_MAX_ENTRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_entries);

        Self {
            enabled,
            entry_ttl,
            max_entries,
        }
    }
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug)]
struct MemoEntry {
    value: Value,
    /// Watermarks of the entry's tags when its computation started.
    snapshot: WatermarkSnapshot,
    stored_at: Instant,
    /// Insertion sequence, used for oldest-first eviction.
    seq: u64,
}

impl MemoEntry {
    fn is_live(&self, ttl: Duration, watermarks: &TagWatermarks) -> bool {
        self.stored_at.elapsed() < ttl && watermarks.unchanged_since(&self.snapshot)
    }
}

#[derive(Debug, Default)]
struct MemoState {
    entries: HashMap<CacheKey, MemoEntry>,
    index: HashMap<CacheTag, HashSet<CacheKey>>,
    order: BTreeMap<u64, CacheKey>,
    watermarks: TagWatermarks,
    next_seq: u64,
}

impl MemoState {
    /// Remove an entry and unlink it from every tag it was indexed under.
    fn remove(&mut self, key: &CacheKey) -> bool {
        let Some(entry) = self.entries.remove(key) else {
            return false;
        };
        for tag in entry.snapshot.tags() {
            if let Some(keys) = self.index.get_mut(tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.index.remove(tag);
                }
            }
        }
        self.order.remove(&entry.seq);
        true
    }

    /// Insert an entry, returning how many old entries were evicted for space.
    fn insert(
        &mut self,
        key: CacheKey,
        snapshot: WatermarkSnapshot,
        value: Value,
        max_entries: usize,
    ) -> u64 {
        self.remove(&key);

        self.next_seq += 1;
        let seq = self.next_seq;
        for tag in snapshot.tags() {
            self.index
                .entry(tag.clone())
                .or_default()
                .insert(key.clone());
        }
        self.order.insert(seq, key.clone());
        self.entries.insert(
            key,
            MemoEntry {
                value,
                snapshot,
                stored_at: Instant::now(),
                seq,
            },
        );

        let mut evicted = 0;
        while self.entries.len() > max_entries {
            let Some((_, oldest)) = self.order.pop_first() else {
                break;
            };
            if self.remove(&oldest) {
                evicted += 1;
            }
        }
        evicted
    }
}

/// Counts a computation from the moment its watermark snapshot is taken
/// until it is dropped, including when the computation fails or is cancelled.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

// ============================================================================
// MEMO CACHE
// ============================================================================

/// Process-wide memo cache with tag-based invalidation.
///
/// # Guarantees
///
/// - After `revalidate` returns, no later read returns a value that was
///   cached for those tags before the revalidation.
/// - A computation that overlaps a revalidation of one of its tags returns
///   its result to its caller but does not store it.
/// - Errors are never cached.
///
/// Single-process only; there is no cross-node invalidation.
#[derive(Debug)]
pub struct MemoCache {
    config: CacheConfig,
    state: RwLock<MemoState>,
    /// Computations holding a watermark snapshot. Incremented under the
    /// `state` read lock, so a writer never misses a snapshot taken before it.
    in_flight: AtomicUsize,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
    evictions: AtomicU64,
}

impl Default for MemoCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl MemoCache {
    /// Create a new memo cache.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            state: RwLock::new(MemoState::default()),
            in_flight: AtomicUsize::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the memoized value for `key`, or run `compute` and memoize it
    /// under `tags`.
    ///
    /// No lock is held while `compute` runs.
    pub async fn get_or_compute<T, F, Fut>(
        &self,
        key: CacheKey,
        tags: &[CacheTag],
        compute: F,
    ) -> PollenResult<T>
    where
        T: Memoizable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = PollenResult<T>>,
    {
        if !self.config.enabled {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return compute().await;
        }

        let (cached, snapshot, _in_flight) = {
            let state = self.state.read().await;
            let in_flight = InFlight::enter(&self.in_flight);
            let cached = state
                .entries
                .get(&key)
                .filter(|entry| entry.is_live(self.config.entry_ttl, &state.watermarks))
                .map(|entry| entry.value.clone());
            (cached, state.watermarks.snapshot(tags), in_flight)
        };

        if let Some(value) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return match serde_json::from_value::<T>(value) {
                Ok(decoded) => Ok(decoded),
                Err(e) => {
                    error!(cache_key = %key, error = %e, "Cached value failed validation");
                    self.state.write().await.remove(&key);
                    Err(PollenError::Validation(format!(
                        "Cached value for {} is invalid: {}",
                        key, e
                    )))
                }
            };
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(cache_key = %key, "Cache miss");
        let value = compute().await?;

        match serde_json::to_value(&value) {
            Ok(json) => self.store(key, snapshot, json).await,
            Err(e) => warn!(cache_key = %key, error = %e, "Value not cacheable"),
        }
        Ok(value)
    }

    async fn store(&self, key: CacheKey, snapshot: WatermarkSnapshot, json: Value) {
        let mut state = self.state.write().await;
        if !state.watermarks.unchanged_since(&snapshot) {
            debug!(cache_key = %key, "Tag revalidated during compute, not storing");
            return;
        }
        let evicted = state.insert(key, snapshot, json, self.config.max_entries);
        if evicted > 0 {
            self.evictions.fetch_add(evicted, Ordering::Relaxed);
        }
        // The caller's own snapshot has just been checked.
        self.prune_watermarks(&mut state, 1);
    }

    /// Drop every watermark when at most `own` computations (the caller's)
    /// hold a snapshot. Stored entries stay valid since every entry indexed
    /// under a revalidated tag was evicted with it.
    fn prune_watermarks(&self, state: &mut MemoState, own: usize) {
        if self.in_flight.load(Ordering::SeqCst) <= own && !state.watermarks.is_empty() {
            state.watermarks.prune();
        }
    }

    /// Revalidate tags: advance their watermarks and evict every entry
    /// indexed under any of them, in one critical section.
    ///
    /// Returns the number of evicted entries.
    pub async fn revalidate(&self, tags: &[CacheTag]) -> usize {
        let mut state = self.state.write().await;
        let mut evicted = 0;
        for tag in tags {
            state.watermarks.advance(tag);
            if let Some(keys) = state.index.remove(tag) {
                for key in keys {
                    if state.remove(&key) {
                        evicted += 1;
                    }
                }
            }
        }
        self.prune_watermarks(&mut state, 0);
        self.invalidations
            .fetch_add(tags.len() as u64, Ordering::Relaxed);
        debug!(
            tags = ?tags.iter().map(CacheTag::as_str).collect::<Vec<_>>(),
            evicted,
            "Revalidated cache tags"
        );
        evicted
    }

    /// Revalidate every tag a selector names within `scope`.
    pub async fn revalidate_selector(&self, scope: TagScope, selector: &TagSelector) -> usize {
        self.revalidate(&selector.tags(scope)).await
    }

    /// Number of entries currently stored.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of tags currently carrying a watermark.
    pub async fn watermark_count(&self) -> usize {
        self.state.read().await.watermarks.len()
    }

    /// Get cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let entry_count = self.state.read().await.entries.len() as u64;
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entry_count,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
