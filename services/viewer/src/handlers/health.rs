//! Health checks and metrics.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use storage::DatasetCacheStats;

use crate::metrics::MetricsSnapshot;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub source: String,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub metrics: MetricsSnapshot,
    pub dataset_cache: DatasetCacheStats,
}

/// GET /health - Basic health check
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        source: state.datasets.provider_name().to_string(),
    })
}

/// GET /metrics - Prometheus text format
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let cache_stats = state.datasets.stats().await;
    state.metrics.record_dataset_cache_stats(&cache_stats);
    let snapshot = state.metrics.snapshot().await;

    let mut output = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    if state.prometheus.is_none() {
        // No recorder installed: expose the local counters directly
        push_metric(&mut output, "viewer_renders_total", "counter", "Total render attempts", snapshot.renders_total);
        push_metric(&mut output, "viewer_render_errors_total", "counter", "Failed render attempts", snapshot.render_errors);
        push_metric(&mut output, "viewer_render_memo_hits_total", "counter", "Requests served from the last render", snapshot.memo_hits);
        push_metric(&mut output, "viewer_dataset_cache_hits", "gauge", "Dataset cache hits", cache_stats.hits);
        push_metric(&mut output, "viewer_dataset_cache_misses", "gauge", "Dataset cache misses", cache_stats.misses);
        push_metric(&mut output, "viewer_dataset_cache_entries", "gauge", "Open dataset handles", cache_stats.entries as u64);
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        output,
    )
        .into_response()
}

/// GET /api/stats - JSON metrics for the UI
pub async fn stats_handler(Extension(state): Extension<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        metrics: state.metrics.snapshot().await,
        dataset_cache: state.datasets.stats().await,
    })
}

fn push_metric(output: &mut String, name: &str, kind: &str, help: &str, value: u64) {
    output.push_str(&format!(
        "# HELP {name} {help}\n# TYPE {name} {kind}\n{name} {value}\n"
    ));
}
