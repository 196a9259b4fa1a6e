//! GFS forecast panel viewer service.
//!
//! Library half of the `viewer` binary, exposed for handler tests.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod request;
pub mod state;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// All routes with middleware applied.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // UI shell
        .route("/", get(handlers::index_handler))
        .route("/view", get(handlers::view_handler))
        // API
        .route("/api/panel", get(handlers::panel_handler))
        .route("/api/parameters", get(handlers::parameters_handler))
        .route("/api/stats", get(handlers::stats_handler))
        // Health and metrics
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
