//! Deterministic demo data for running the viewer offline.
//!
//! Every cycle opens to a small 0.25° grid around the configured region with
//! smooth, plausible fields for all variables the panel uses. Values depend
//! only on the cycle and the grid position, so renders are reproducible.

use std::f64::consts::TAU;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Duration, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use forecast_common::{BoundingBox, DatasetProvider, ForecastCycle, ForecastDataset, GridAxes, ViewerResult};

use crate::memory::MemoryDataset;

/// Shape of the generated datasets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Region the grid is centred on
    pub region: BoundingBox,
    /// Extra coverage around the region, degrees
    pub margin_deg: f64,
    /// Grid spacing, degrees
    pub resolution_deg: f64,
    /// Length of the time axis
    pub time_steps: usize,
    /// Hours between time steps
    pub step_hours: i64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            region: BoundingBox::new(114.0, -2.5, 115.5, -1.0),
            margin_deg: 1.0,
            resolution_deg: 0.25,
            time_steps: 129,
            step_hours: 3,
        }
    }
}

/// Provider producing synthetic datasets for any cycle.
#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider {
    config: SyntheticConfig,
}

impl SyntheticProvider {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }

    /// Build the dataset for a cycle.
    pub fn build(&self, cycle: ForecastCycle) -> MemoryDataset {
        let cfg = &self.config;
        let res = cfg.resolution_deg.max(0.01);
        let area = cfg.region.expand(cfg.margin_deg);

        let snapped_axis = |lo: f64, hi: f64| -> Vec<f64> {
            let start = (lo / res).floor() as i64;
            let end = (hi / res).ceil() as i64;
            (start..=end).map(|i| i as f64 * res).collect()
        };
        let lats = snapped_axis(area.min_y, area.max_y);
        let lons = snapped_axis(area.min_x, area.max_x);

        let reference = cycle.reference_time();
        let times = (0..cfg.time_steps)
            .map(|i| reference + Duration::hours(cfg.step_hours * i as i64))
            .collect::<Vec<_>>();

        let center_lon = (cfg.region.min_x + cfg.region.max_x) / 2.0;
        let center_lat = (cfg.region.min_y + cfg.region.max_y) / 2.0;
        let phase = (cycle.date.ordinal() as f64 * 0.37 + cycle.hour.hour() as f64 * 0.11) % TAU;
        let step_hours = cfg.step_hours as f64;
        let start_hour = reference.hour() as f64;

        debug!(
            cycle = %cycle,
            lat_points = lats.len(),
            lon_points = lons.len(),
            time_steps = times.len(),
            "Building synthetic dataset"
        );

        let hours = move |t: usize| start_hour + t as f64 * step_hours;

        MemoryDataset::new(cycle, GridAxes::new(times, lats, lons))
            .with_generated("pratesfc", move |t, lat, lon| {
                // A convective cell drifting around the region centre, strongest
                // in the local afternoon (UTC+7).
                let angle = TAU * hours(t) / 24.0 + phase;
                let cx = center_lon + 0.6 * angle.sin();
                let cy = center_lat + 0.4 * angle.cos();
                let d2 = (lon - cx).powi(2) + (lat - cy).powi(2);
                let local_hour = (hours(t) + 7.0) % 24.0;
                let diurnal = 0.5 + 0.5 * (TAU * (local_hour - 9.0) / 24.0).sin();
                (0.003 * diurnal * (-d2 / 0.15).exp()) as f32
            })
            .with_generated("tmp2m", move |t, lat, lon| {
                let local_hour = (hours(t) + lon / 15.0) % 24.0;
                let diurnal = (TAU * (local_hour - 9.0) / 24.0).sin();
                (300.5 + 5.0 * diurnal - 0.8 * (lat - center_lat)) as f32
            })
            .with_generated("ugrd10m", move |t, lat, _lon| {
                (-3.0 + 2.5 * (lat * 3.0 + t as f64 * 0.2 + phase).sin()) as f32
            })
            .with_generated("vgrd10m", move |t, _lat, lon| {
                (1.5 * (lon * 2.0 + t as f64 * 0.3).cos()) as f32
            })
            .with_generated("prmslmsl", move |t, lat, lon| {
                let d2 = (lon - center_lon).powi(2) + (lat - center_lat).powi(2);
                let semi_diurnal = (TAU * hours(t) / 12.0).cos();
                (101_000.0 - 300.0 * (-d2).exp() + 150.0 * semi_diurnal) as f32
            })
            .with_generated("landsfc", |_t, lat, lon| {
                let coast = -3.1 + 0.2 * (lon * 3.0).sin();
                if lat > coast {
                    1.0
                } else {
                    0.0
                }
            })
    }
}

#[async_trait]
impl DatasetProvider for SyntheticProvider {
    async fn open(&self, cycle: ForecastCycle) -> ViewerResult<Arc<dyn ForecastDataset>> {
        Ok(Arc::new(self.build(cycle)))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use forecast_common::RunHour;

    fn cycle() -> ForecastCycle {
        ForecastCycle::new(NaiveDate::from_ymd_opt(2025, 7, 13).unwrap(), RunHour::Z00)
    }

    #[test]
    fn test_axes_cover_region() {
        let dataset = SyntheticProvider::default().build(cycle());
        let axes = dataset.axes();
        assert_eq!(axes.time_len(), 129);
        assert_eq!(axes.times[0], cycle().reference_time());
        let coverage = axes.coverage().unwrap();
        assert!(coverage.contains_point(114.0, -2.5) && coverage.contains_point(115.5, -1.0));
        assert!(axes.select(&BoundingBox::new(114.0, -2.5, 115.5, -1.0)).is_some());
    }

    #[test]
    fn test_all_variables_present() {
        let dataset = SyntheticProvider::default().build(cycle());
        for name in ["pratesfc", "tmp2m", "ugrd10m", "vgrd10m", "prmslmsl", "landsfc"] {
            assert!(dataset.has_variable(name), "{name} missing");
        }
    }

    #[tokio::test]
    async fn test_deterministic_and_plausible() {
        let provider = SyntheticProvider::default();
        let a = provider.build(cycle());
        let b = provider.build(cycle());
        let window = a.axes().select(&BoundingBox::new(114.0, -2.5, 115.5, -1.0)).unwrap();

        let ta = a.read("tmp2m", 5, &window).await.unwrap();
        let tb = b.read("tmp2m", 5, &window).await.unwrap();
        assert_eq!(ta, tb);
        let (min, max) = ta.value_range().unwrap();
        assert!(min > 290.0 && max < 310.0, "{min}..{max}");

        let rain = a.read("pratesfc", 5, &window).await.unwrap();
        assert!(rain.values.iter().all(|&v| v >= 0.0));
    }
}
