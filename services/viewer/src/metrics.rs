//! Render and request metrics.
//!
//! Counters are kept locally (for `/metrics` and the JSON stats) and also
//! forwarded to the `metrics` facade so an installed Prometheus recorder
//! sees them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use serde::Serialize;
use tokio::sync::RwLock;

use forecast_common::Parameter;
use storage::DatasetCacheStats;

#[derive(Debug, Default)]
struct TimingStats {
    count: u64,
    total_us: u64,
    min_us: u64,
    max_us: u64,
    last_us: u64,
}

impl TimingStats {
    fn record(&mut self, duration_us: u64) {
        self.count += 1;
        self.total_us += duration_us;
        self.last_us = duration_us;
        if self.min_us == 0 || duration_us < self.min_us {
            self.min_us = duration_us;
        }
        if duration_us > self.max_us {
            self.max_us = duration_us;
        }
    }

    fn avg_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.total_us as f64 / self.count as f64) / 1000.0
        }
    }
}

/// Metrics collector for the viewer.
#[derive(Debug)]
pub struct MetricsCollector {
    pub page_requests: AtomicU64,
    pub panel_requests: AtomicU64,
    pub renders_total: AtomicU64,
    pub render_errors: AtomicU64,
    /// Requests answered from the last-render memo
    pub memo_hits: AtomicU64,
    render_times: RwLock<TimingStats>,
    start_time: Instant,
}

/// Point-in-time copy of the collector.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub page_requests: u64,
    pub panel_requests: u64,
    pub renders_total: u64,
    pub render_errors: u64,
    pub memo_hits: u64,
    pub render_avg_ms: f64,
    pub render_min_ms: f64,
    pub render_max_ms: f64,
    pub render_last_ms: f64,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            page_requests: AtomicU64::new(0),
            panel_requests: AtomicU64::new(0),
            renders_total: AtomicU64::new(0),
            render_errors: AtomicU64::new(0),
            memo_hits: AtomicU64::new(0),
            render_times: RwLock::new(TimingStats::default()),
            start_time: Instant::now(),
        }
    }

    pub fn record_page_request(&self) {
        self.page_requests.fetch_add(1, Ordering::Relaxed);
        counter!("viewer_page_requests_total").increment(1);
    }

    pub fn record_panel_request(&self) {
        self.panel_requests.fetch_add(1, Ordering::Relaxed);
        counter!("viewer_panel_requests_total").increment(1);
    }

    pub fn record_memo_hit(&self) {
        self.memo_hits.fetch_add(1, Ordering::Relaxed);
        counter!("viewer_render_memo_hits_total").increment(1);
    }

    /// Record one render attempt; `error_kind` is `None` on success.
    pub async fn record_render(&self, parameter: Parameter, duration_us: u64, error_kind: Option<&'static str>) {
        self.renders_total.fetch_add(1, Ordering::Relaxed);
        let outcome = match error_kind {
            Some(kind) => {
                self.render_errors.fetch_add(1, Ordering::Relaxed);
                kind
            }
            None => "ok",
        };
        counter!("viewer_renders_total", "parameter" => parameter.id(), "outcome" => outcome).increment(1);

        if error_kind.is_none() {
            histogram!("viewer_render_duration_ms", "parameter" => parameter.id())
                .record(duration_us as f64 / 1000.0);
            self.render_times.write().await.record(duration_us);
        }
    }

    /// Publish dataset cache statistics as gauges.
    pub fn record_dataset_cache_stats(&self, stats: &DatasetCacheStats) {
        gauge!("viewer_dataset_cache_hits").set(stats.hits as f64);
        gauge!("viewer_dataset_cache_misses").set(stats.misses as f64);
        gauge!("viewer_dataset_cache_failures").set(stats.failures as f64);
        gauge!("viewer_dataset_cache_entries").set(stats.entries as f64);
        gauge!("viewer_dataset_cache_hit_rate_percent").set(stats.hit_rate());
    }

    pub async fn snapshot(&self) -> MetricsSnapshot {
        let times = self.render_times.read().await;
        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            page_requests: self.page_requests.load(Ordering::Relaxed),
            panel_requests: self.panel_requests.load(Ordering::Relaxed),
            renders_total: self.renders_total.load(Ordering::Relaxed),
            render_errors: self.render_errors.load(Ordering::Relaxed),
            memo_hits: self.memo_hits.load(Ordering::Relaxed),
            render_avg_ms: times.avg_ms(),
            render_min_ms: times.min_us as f64 / 1000.0,
            render_max_ms: times.max_us as f64 / 1000.0,
            render_last_ms: times.last_us as f64 / 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_render_outcomes_are_counted() {
        let metrics = MetricsCollector::new();
        metrics.record_render(Parameter::PrecipitationRate, 2_000, None).await;
        metrics.record_render(Parameter::PrecipitationRate, 4_000, None).await;
        metrics
            .record_render(Parameter::Wind10m, 10, Some("ForecastUnavailable"))
            .await;

        let snapshot = metrics.snapshot().await;
        assert_eq!(snapshot.renders_total, 3);
        assert_eq!(snapshot.render_errors, 1);
        assert_eq!(snapshot.render_avg_ms, 3.0);
        assert_eq!(snapshot.render_min_ms, 2.0);
        assert_eq!(snapshot.render_max_ms, 4.0);
        assert_eq!(snapshot.render_last_ms, 4.0);
    }
}
