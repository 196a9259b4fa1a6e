//! NOMADS GrADS data server client.
//!
//! Each GFS cycle is one OPeNDAP dataset at
//! `{base_url}/gfs{YYYYMMDD}/gfs_0p25_{HH}z`. Opening a dataset fetches the
//! DDS (variable names) and the coordinate axes; values are fetched per
//! read as an ASCII hyperslab.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use forecast_common::{
    DatasetProvider, ForecastCycle, ForecastDataset, ForecastUnavailable, GridAxes, GridSlice,
    GridWindow, ViewerError, ViewerResult,
};

use crate::error::{SourceError, SourceResult};
use crate::opendap::{self, grads_days_to_datetime, AsciiArray, GRADS_FILL_THRESHOLD};

/// Default NOMADS endpoint for the 0.25° GFS.
pub const DEFAULT_BASE_URL: &str = "https://nomads.ncep.noaa.gov/dods/gfs_0p25";

/// Connection settings for the NOMADS server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NomadsConfig {
    /// Base URL without trailing slash
    pub base_url: String,
    /// Dataset name prefix inside a run directory
    pub product: String,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for NomadsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            product: "gfs_0p25".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl NomadsConfig {
    /// Dataset URL for a cycle (without the `.dds`/`.ascii` suffix).
    pub fn dataset_url(&self, cycle: &ForecastCycle) -> String {
        format!(
            "{}/gfs{}/{}_{}z",
            self.base_url.trim_end_matches('/'),
            cycle.date_token(),
            self.product,
            cycle.hour.token()
        )
    }
}

/// Opens GFS cycles from a NOMADS GrADS data server.
pub struct NomadsProvider {
    client: Client,
    config: NomadsConfig,
}

impl NomadsProvider {
    pub fn new(config: NomadsConfig) -> ViewerResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ViewerError::source_unavailable("NOMADS client", e))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &NomadsConfig {
        &self.config
    }

    async fn open_dataset(&self, cycle: ForecastCycle) -> SourceResult<NomadsDataset> {
        let url = self.config.dataset_url(&cycle);

        let dds = fetch_text(&self.client, &format!("{}.dds", url)).await?;
        let declared = opendap::parse_dds(&dds)?;
        let variables: Vec<String> = declared
            .iter()
            .filter(|v| v.dims.len() >= 3)
            .map(|v| v.name.clone())
            .collect();

        let axes_body = fetch_text(&self.client, &format!("{}.ascii?time,lat,lon", url)).await?;
        let axes = parse_axes(&opendap::parse_ascii(&axes_body)?)?;

        info!(
            url = %url,
            variables = variables.len(),
            time_steps = axes.time_len(),
            lat_points = axes.lats.len(),
            lon_points = axes.lons.len(),
            "Opened NOMADS dataset"
        );

        Ok(NomadsDataset {
            cycle,
            url,
            client: self.client.clone(),
            variables,
            axes,
        })
    }
}

#[async_trait]
impl DatasetProvider for NomadsProvider {
    #[instrument(skip(self, cycle), fields(cycle = %cycle))]
    async fn open(&self, cycle: ForecastCycle) -> ViewerResult<Arc<dyn ForecastDataset>> {
        let dataset = self
            .open_dataset(cycle)
            .await
            .map_err(|e| e.into_viewer_error(cycle))?;
        Ok(Arc::new(dataset))
    }

    fn name(&self) -> &str {
        "nomads"
    }
}

/// One opened GFS cycle on the NOMADS server.
pub struct NomadsDataset {
    cycle: ForecastCycle,
    url: String,
    client: Client,
    variables: Vec<String>,
    axes: GridAxes,
}

impl NomadsDataset {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// `{url}.ascii?var[t:t][y0:y1][x0:x1]` (OPeNDAP ranges are inclusive).
    fn hyperslab_url(&self, variable: &str, time_index: usize, window: &GridWindow) -> String {
        format!(
            "{}.ascii?{}[{}:{}][{}:{}][{}:{}]",
            self.url,
            variable,
            time_index,
            time_index,
            window.lat.start,
            window.lat.end - 1,
            window.lon.start,
            window.lon.end - 1
        )
    }

    async fn fetch_slice(
        &self,
        variable: &str,
        time_index: usize,
        window: &GridWindow,
    ) -> SourceResult<GridSlice> {
        let url = self.hyperslab_url(variable, time_index, window);
        let body = fetch_text(&self.client, &url).await?;
        let arrays = opendap::parse_ascii(&body)?;

        let array = arrays
            .iter()
            .find(|a| a.name == variable || a.name.ends_with(&format!(".{}", variable)))
            .ok_or_else(|| SourceError::InvalidFormat(format!("response lacks '{}'", variable)))?;

        let expected = [1, window.height(), window.width()];
        if array.dims != expected {
            return Err(SourceError::InvalidFormat(format!(
                "{} has shape {:?}, expected {:?}",
                variable, array.dims, expected
            )));
        }

        let values = array
            .values
            .iter()
            .map(|&v| {
                if v.abs() >= GRADS_FILL_THRESHOLD {
                    f32::NAN
                } else {
                    v as f32
                }
            })
            .collect();

        Ok(GridSlice::new(
            self.axes.lats[window.lat.clone()].to_vec(),
            self.axes.lons[window.lon.clone()].to_vec(),
            values,
        ))
    }
}

#[async_trait]
impl ForecastDataset for NomadsDataset {
    fn cycle(&self) -> ForecastCycle {
        self.cycle
    }

    fn axes(&self) -> &GridAxes {
        &self.axes
    }

    fn has_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }

    fn variables(&self) -> Vec<String> {
        self.variables.clone()
    }

    #[instrument(skip(self, window), fields(cycle = %self.cycle, lat = ?window.lat, lon = ?window.lon))]
    async fn read(
        &self,
        variable: &str,
        time_index: usize,
        window: &GridWindow,
    ) -> ViewerResult<GridSlice> {
        if !self.has_variable(variable) {
            return Err(ViewerError::DataFieldMissing(variable.to_string()));
        }
        if time_index >= self.axes.time_len() {
            return Err(ForecastUnavailable::LeadHourOutOfRange {
                requested: time_index,
                available: self.axes.time_len(),
            }
            .into());
        }
        if window.is_empty()
            || window.lat.end > self.axes.lats.len()
            || window.lon.end > self.axes.lons.len()
        {
            return Err(ViewerError::InvalidParameter {
                param: "window".to_string(),
                message: format!("{:?} is outside the grid", window),
            });
        }

        let slice = self
            .fetch_slice(variable, time_index, window)
            .await
            .map_err(|e| e.into_viewer_error(self.cycle))?;
        debug!(points = slice.values.len(), "Fetched hyperslab");
        Ok(slice)
    }
}

async fn fetch_text(client: &Client, url: &str) -> SourceResult<String> {
    debug!(url = %url, "GET");
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.text().await?)
}

fn parse_axes(arrays: &[AsciiArray]) -> SourceResult<GridAxes> {
    let find = |name: &str| {
        arrays
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.values.clone())
            .ok_or_else(|| SourceError::InvalidFormat(format!("axis '{}' missing", name)))
    };

    let times = find("time")?
        .into_iter()
        .map(|days| {
            grads_days_to_datetime(days)
                .ok_or_else(|| SourceError::InvalidFormat(format!("bad time value {}", days)))
        })
        .collect::<SourceResult<Vec<_>>>()?;

    Ok(GridAxes::new(times, find("lat")?, find("lon")?))
}
