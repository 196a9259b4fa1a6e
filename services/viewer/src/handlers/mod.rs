//! HTTP request handlers.
//!
//! - `page`: HTML form and result view
//! - `panel`: PNG panel and parameter listing
//! - `health`: health check, Prometheus metrics, JSON stats
//! - `common`: JSON error responses and HTML escaping

pub mod common;
pub mod health;
pub mod page;
pub mod panel;

pub use common::{escape_html, ApiError, ErrorBody};
pub use health::{health_handler, metrics_handler, stats_handler};
pub use page::{index_handler, view_handler, PAGE_SUBTITLE, PAGE_TITLE};
pub use panel::{panel_handler, parameters_handler, ParametersResponse};
