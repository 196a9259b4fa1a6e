//! Panel image and parameter listing endpoints.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, instrument};

use forecast_panel::table::{self, PanelStyle};

use super::common::ApiError;
use crate::request::PanelQuery;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ParameterInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub units: &'static str,
    pub variables: &'static [&'static str],
    pub style: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ParametersResponse {
    pub parameters: Vec<ParameterInfo>,
}

/// GET /api/panel - the rendered panel as PNG; `download=true` adds an
/// attachment filename
#[instrument(skip(state))]
pub async fn panel_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<PanelQuery>,
) -> Result<Response, ApiError> {
    state.metrics.record_panel_request();

    let request = query.parse()?;
    let panel = state.render_panel(request).await?;

    info!(title = %panel.title, bytes = panel.png.len(), download = query.download, "Serving panel");

    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        panel.png.clone(),
    )
        .into_response();

    if query.download {
        let disposition = format!("attachment; filename=\"{}\"", panel.download_filename());
        if let Ok(value) = HeaderValue::from_str(&disposition) {
            response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
        }
    }
    Ok(response)
}

/// GET /api/parameters - selectable parameters
pub async fn parameters_handler() -> Json<ParametersResponse> {
    let parameters = table::all()
        .iter()
        .map(|spec| ParameterInfo {
            id: spec.parameter.id(),
            label: spec.label,
            units: spec.units,
            variables: spec.variables,
            style: match spec.style {
                PanelStyle::Shaded { barbs: true, .. } => "shaded+barbs",
                PanelStyle::Shaded { .. } => "shaded",
                PanelStyle::Contours { .. } => "contours",
            },
        })
        .collect();
    Json(ParametersResponse { parameters })
}
