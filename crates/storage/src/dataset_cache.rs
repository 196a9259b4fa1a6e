//! Memoized dataset handles keyed by forecast cycle.
//!
//! Opening a remote dataset costs several round trips, so handles are kept
//! and reused for every later request on the same cycle. The eviction
//! policy is explicit: keep everything for the process lifetime, or keep the
//! most recently used `capacity` cycles.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use forecast_common::{DatasetProvider, ForecastCycle, ForecastDataset, ViewerResult};

/// When cached handles are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Never evict; handles live for the process lifetime.
    #[default]
    Never,
    /// Keep at most `capacity` cycles, dropping the least recently used.
    Lru { capacity: usize },
}

/// Statistics for the dataset cache
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Opens that returned an error (never cached)
    pub failures: u64,
    pub evictions: u64,
    pub entries: usize,
}

impl DatasetCacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

struct Inner {
    handles: LruCache<ForecastCycle, Arc<dyn ForecastDataset>>,
    stats: DatasetCacheStats,
}

/// Cache of opened datasets in front of a [`DatasetProvider`].
///
/// The lock is held while a missing cycle is opened, so concurrent requests
/// for the same cycle open it once.
pub struct DatasetCache {
    provider: Arc<dyn DatasetProvider>,
    policy: EvictionPolicy,
    inner: Mutex<Inner>,
}

impl DatasetCache {
    pub fn new(provider: Arc<dyn DatasetProvider>, policy: EvictionPolicy) -> Self {
        let handles = match policy {
            EvictionPolicy::Never => LruCache::unbounded(),
            EvictionPolicy::Lru { capacity } => {
                LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN))
            }
        };

        Self {
            provider,
            policy,
            inner: Mutex::new(Inner {
                handles,
                stats: DatasetCacheStats::default(),
            }),
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Return the cached handle for `cycle`, opening it on a miss.
    ///
    /// Failed opens are reported and not remembered; the next request for
    /// the same cycle tries again.
    pub async fn get_or_open(&self, cycle: ForecastCycle) -> ViewerResult<Arc<dyn ForecastDataset>> {
        let mut inner = self.inner.lock().await;

        if let Some(dataset) = inner.handles.get(&cycle) {
            let dataset = dataset.clone();
            inner.stats.hits += 1;
            debug!(cycle = %cycle, "Dataset cache hit");
            return Ok(dataset);
        }

        inner.stats.misses += 1;
        debug!(cycle = %cycle, provider = self.provider.name(), "Dataset cache miss, opening");

        match self.provider.open(cycle).await {
            Ok(dataset) => {
                if let Some((evicted, _)) = inner.handles.push(cycle, dataset.clone()) {
                    if evicted != cycle {
                        inner.stats.evictions += 1;
                        info!(evicted = %evicted, "Evicted dataset handle");
                    }
                }
                inner.stats.entries = inner.handles.len();
                Ok(dataset)
            }
            Err(e) => {
                inner.stats.failures += 1;
                warn!(cycle = %cycle, error = %e, "Failed to open dataset");
                Err(e)
            }
        }
    }

    /// Whether a handle for `cycle` is currently cached (does not touch LRU order).
    pub async fn contains(&self, cycle: &ForecastCycle) -> bool {
        self.inner.lock().await.handles.contains(cycle)
    }

    /// Get current cache statistics.
    pub async fn stats(&self) -> DatasetCacheStats {
        let inner = self.inner.lock().await;
        DatasetCacheStats {
            entries: inner.handles.len(),
            ..inner.stats.clone()
        }
    }

    /// Drop every cached handle.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        let dropped = inner.handles.len();
        inner.handles.clear();
        inner.stats.entries = 0;
        info!(dropped, "Cleared dataset cache");
    }
}
