//! Application state and the render entry point shared by all handlers.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use forecast_common::{DatasetProvider, ViewerResult};
use forecast_panel::{PanelRenderer, RenderedPanel};
use forecast_source::{NomadsProvider, SyntheticProvider};
use storage::{DatasetCache, EvictionPolicy};

use crate::config::{SourceConfig, SourceKind, ViewerConfig};
use crate::metrics::MetricsCollector;
use crate::request::PanelRequest;

/// The most recent successful render, reused by the image and the download.
type LastRender = Option<(PanelRequest, Arc<RenderedPanel>)>;

/// Shared application state.
pub struct AppState {
    pub datasets: DatasetCache,
    pub renderer: PanelRenderer,
    pub metrics: Arc<MetricsCollector>,
    pub prometheus: Option<PrometheusHandle>,
    /// Held for the whole render, so renders run one at a time
    last_render: Mutex<LastRender>,
}

impl AppState {
    /// Build from the loaded configuration.
    pub fn new(config: &ViewerConfig, prometheus: Option<PrometheusHandle>) -> Result<Self> {
        let provider = build_provider(&config.source)?;
        let renderer = PanelRenderer::new(&config.panel);
        let mut state = Self::with_provider(provider, config.cache, renderer);
        state.prometheus = prometheus;
        Ok(state)
    }

    pub fn with_provider(provider: Arc<dyn DatasetProvider>, policy: EvictionPolicy, renderer: PanelRenderer) -> Self {
        info!(provider = provider.name(), policy = ?policy, "Dataset source ready");
        Self {
            datasets: DatasetCache::new(provider, policy),
            renderer,
            metrics: Arc::new(MetricsCollector::new()),
            prometheus: None,
            last_render: Mutex::new(None),
        }
    }

    /// Render a panel, or return the previous result for the same request.
    #[instrument(skip(self), fields(cycle = %request.cycle, lead = request.lead_index, parameter = %request.parameter))]
    pub async fn render_panel(&self, request: PanelRequest) -> ViewerResult<Arc<RenderedPanel>> {
        let mut last = self.last_render.lock().await;
        if let Some((previous, panel)) = last.as_ref() {
            if *previous == request {
                self.metrics.record_memo_hit();
                return Ok(panel.clone());
            }
        }

        let start = Instant::now();
        let result = self.render_uncached(request).await;
        let elapsed_us = start.elapsed().as_micros() as u64;
        self.metrics
            .record_render(request.parameter, elapsed_us, result.as_ref().err().map(|e| e.kind()))
            .await;

        let panel = Arc::new(result?);
        *last = Some((request, panel.clone()));
        Ok(panel)
    }

    async fn render_uncached(&self, request: PanelRequest) -> ViewerResult<RenderedPanel> {
        let dataset = self.datasets.get_or_open(request.cycle).await?;
        self.renderer
            .render(dataset.as_ref(), request.lead_index, request.parameter)
            .await
    }
}

fn build_provider(source: &SourceConfig) -> Result<Arc<dyn DatasetProvider>> {
    let provider: Arc<dyn DatasetProvider> = match source.kind {
        SourceKind::Nomads => Arc::new(NomadsProvider::new(source.nomads.clone())?),
        SourceKind::Demo => Arc::new(SyntheticProvider::new(source.demo.clone())),
    };
    Ok(provider)
}
