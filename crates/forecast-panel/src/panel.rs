//! The forecast panel pipeline.
//!
//! `render` runs, in order: lead-index bounds check, variable lookup,
//! regional crop, field derivation, valid-time labels, figure composition
//! and PNG encoding. Any failure before the figure is drawn aborts the
//! request with no image.

use std::time::Instant;

use forecast_common::{
    BoundingBox, ForecastCycle, ForecastDataset, ForecastUnavailable, GridSlice, LeadLabel, Parameter,
    ValidTimeLabel, ViewerError, ViewerResult,
};
use image::RgbaImage;
use renderer::{ColorScale, FieldLayer, Figure, FigureStyle, RenderStats};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::derive::DerivedField;
use crate::overlays::{OverlayConfig, PanelOverlays};
use crate::table::{self, PanelStyle, ParameterSpec};

/// Settings shared by every panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    pub region: BoundingBox,
    pub figure: FigureStyle,
    pub overlays: OverlayConfig,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            region: BoundingBox::new(114.0, -2.5, 115.5, -1.0),
            figure: FigureStyle::default(),
            overlays: OverlayConfig::default(),
        }
    }
}

/// One rendered panel: the image, its PNG encoding and the labels used.
#[derive(Debug, Clone)]
pub struct RenderedPanel {
    pub cycle: ForecastCycle,
    pub parameter: Parameter,
    pub lead_index: usize,
    pub title: String,
    pub valid_time: ValidTimeLabel,
    pub lead: LeadLabel,
    pub image: RgbaImage,
    pub png: Vec<u8>,
    pub stats: RenderStats,
}

impl RenderedPanel {
    /// Name offered for the download, e.g. `gfs_precip_2025071300z_t+000.png`.
    pub fn download_filename(&self) -> String {
        download_filename(&self.cycle, self.parameter, self.lead_index)
    }

    /// Status line for the UI.
    pub fn status_message(&self) -> String {
        format!("Berhasil: {}", self.title)
    }
}

pub fn download_filename(cycle: &ForecastCycle, parameter: Parameter, lead_index: usize) -> String {
    format!(
        "gfs_{}_{}{}z_{}.png",
        parameter.id(),
        cycle.date_token(),
        cycle.hour.token(),
        LeadLabel::from_index(lead_index)
    )
}

/// Title: "{label} ({units}) Valid {valid time} {lead}".
pub fn panel_title(spec: &ParameterSpec, valid: &ValidTimeLabel, lead: &LeadLabel) -> String {
    format!("{} Valid {} {}", spec.caption(), valid, lead)
}

/// Renders forecast panels for a fixed region with preloaded overlays.
#[derive(Debug)]
pub struct PanelRenderer {
    region: BoundingBox,
    style: FigureStyle,
    overlays: PanelOverlays,
}

impl PanelRenderer {
    /// Build from settings, loading overlays (best-effort).
    pub fn new(settings: &PanelSettings) -> Self {
        Self::with_overlays(
            settings.region,
            settings.figure.clone(),
            PanelOverlays::load(&settings.overlays),
        )
    }

    pub fn with_overlays(region: BoundingBox, style: FigureStyle, overlays: PanelOverlays) -> Self {
        Self {
            region,
            style,
            overlays,
        }
    }

    pub fn region(&self) -> BoundingBox {
        self.region
    }

    /// Render over the configured region.
    pub async fn render(
        &self,
        dataset: &dyn ForecastDataset,
        lead_index: usize,
        parameter: Parameter,
    ) -> ViewerResult<RenderedPanel> {
        self.render_region(dataset, lead_index, parameter, &self.region).await
    }

    #[instrument(skip(self, dataset), fields(cycle = %dataset.cycle(), parameter = %parameter))]
    pub async fn render_region(
        &self,
        dataset: &dyn ForecastDataset,
        lead_index: usize,
        parameter: Parameter,
        region: &BoundingBox,
    ) -> ViewerResult<RenderedPanel> {
        let start = Instant::now();
        let axes = dataset.axes();

        let available = axes.time_len();
        if lead_index >= available {
            return Err(ForecastUnavailable::LeadHourOutOfRange {
                requested: lead_index,
                available,
            }
            .into());
        }

        let spec = table::lookup(parameter);
        if let Some(missing) = spec.variables.iter().find(|name| !dataset.has_variable(name)) {
            return Err(ViewerError::DataFieldMissing(missing.to_string()));
        }

        let window = axes
            .select(region)
            .ok_or(ForecastUnavailable::EmptyRegion { region: *region })?;

        let mut inputs = Vec::with_capacity(spec.variables.len());
        for name in spec.variables {
            let slice = dataset.read(name, lead_index, &window).await?;
            inputs.push(crop(&slice, region)?);
        }
        let derived = DerivedField::derive(spec.conversion, inputs)?;
        if let Some((min, max)) = derived.field.value_range() {
            debug!(variable = spec.variables[0], min = min, max = max, "Derived field");
        }

        let valid_time = ValidTimeLabel::from_datetime(axes.times[lead_index]);
        let lead = LeadLabel::from_index(lead_index);
        let title = panel_title(spec, &valid_time, &lead);

        let land_mask = self.read_land_mask(dataset, lead_index, &window, region).await;

        let figure = self.compose(spec, derived, land_mask, region, &title);
        let rendered = figure
            .render(self.overlays.text.as_ref())
            .map_err(|e| ViewerError::RenderError(e.to_string()))?;
        let png = rendered
            .encode_png()
            .map_err(|e| ViewerError::RenderError(e.to_string()))?;

        info!(
            lead = %lead,
            valid = %valid_time,
            bytes = png.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rendered panel"
        );

        Ok(RenderedPanel {
            cycle: dataset.cycle(),
            parameter,
            lead_index,
            title,
            valid_time,
            lead,
            image: rendered.image,
            png,
            stats: rendered.stats,
        })
    }

    fn compose<'a>(
        &'a self,
        spec: &ParameterSpec,
        derived: DerivedField,
        land_mask: Option<GridSlice>,
        region: &BoundingBox,
        title: &str,
    ) -> Figure<'a> {
        let DerivedField { field, components } = derived;
        let (layer, barbs) = match spec.style {
            PanelStyle::Shaded {
                colormap,
                min,
                max,
                bins,
                barbs,
            } => {
                let scale = ColorScale::new(colormap, min, max);
                let scale = match bins {
                    Some(bins) => scale.with_bins(bins),
                    None => scale,
                };
                let layer = FieldLayer::Shaded {
                    field,
                    scale,
                    caption: spec.caption(),
                };
                (layer, barbs)
            }
            PanelStyle::Contours { interval } => (FieldLayer::Contours { field, interval }, false),
        };

        let mut figure = Figure::new(*region, title, layer).with_style(self.style.clone());
        if let (true, Some((u, v))) = (barbs, components) {
            figure = figure.with_wind(u, v);
        }
        if let Some(mask) = land_mask {
            figure = figure.with_land_mask(mask);
        }
        if let Some(layer) = &self.overlays.borders {
            figure = figure.with_borders(layer);
        }
        if let Some(layer) = &self.overlays.admin {
            figure = figure.with_admin(layer);
        }
        if let Some(marker) = &self.overlays.marker {
            figure = figure.with_marker(marker.clone());
        }
        figure
    }

    /// Land/sea mask for shading and the coastline; absent or unreadable
    /// masks only drop the decoration.
    async fn read_land_mask(
        &self,
        dataset: &dyn ForecastDataset,
        lead_index: usize,
        window: &forecast_common::GridWindow,
        region: &BoundingBox,
    ) -> Option<GridSlice> {
        let name = self.overlays.land_variable.as_deref()?;
        if !dataset.has_variable(name) {
            debug!(variable = name, "Dataset has no land mask");
            return None;
        }
        match dataset.read(name, lead_index, window).await {
            Ok(slice) => slice.crop(region),
            Err(e) => {
                warn!(variable = name, error = %e, "Failed to read land mask");
                None
            }
        }
    }
}

/// Inclusive crop; an empty result means the region misses the grid.
fn crop(slice: &GridSlice, region: &BoundingBox) -> ViewerResult<GridSlice> {
    slice
        .crop(region)
        .filter(|cropped| !cropped.is_empty())
        .ok_or_else(|| ForecastUnavailable::EmptyRegion { region: *region }.into())
}
