//! In-memory datasets, used by tests and by the synthetic demo source.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use forecast_common::{
    DatasetProvider, ForecastCycle, ForecastDataset, ForecastUnavailable, GridAxes, GridSlice,
    GridWindow, ViewerError, ViewerResult,
};

/// A dataset whose fields are fully held in memory.
///
/// Each field is stored as one row-major lat × lon grid per time step.
#[derive(Debug, Clone)]
pub struct MemoryDataset {
    cycle: ForecastCycle,
    axes: GridAxes,
    fields: HashMap<String, Vec<Vec<f32>>>,
    order: Vec<String>,
}

impl MemoryDataset {
    pub fn new(cycle: ForecastCycle, axes: GridAxes) -> Self {
        Self {
            cycle,
            axes,
            fields: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn grid_len(&self) -> usize {
        self.axes.lats.len() * self.axes.lons.len()
    }

    /// Add a field given one grid per time step.
    pub fn with_field(mut self, name: &str, steps: Vec<Vec<f32>>) -> ViewerResult<Self> {
        if steps.len() != self.axes.time_len() {
            return Err(ViewerError::InvalidParameter {
                param: name.to_string(),
                message: format!(
                    "{} time steps given, axis has {}",
                    steps.len(),
                    self.axes.time_len()
                ),
            });
        }
        if let Some(bad) = steps.iter().find(|s| s.len() != self.grid_len()) {
            return Err(ViewerError::InvalidParameter {
                param: name.to_string(),
                message: format!("grid of {} values, expected {}", bad.len(), self.grid_len()),
            });
        }
        self.insert(name, steps);
        Ok(self)
    }

    /// Add a field computed from `(time_index, lat, lon)`.
    pub fn with_generated<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(usize, f64, f64) -> f32,
    {
        let steps = (0..self.axes.time_len())
            .map(|t| {
                self.axes
                    .lats
                    .iter()
                    .flat_map(|&lat| self.axes.lons.iter().map(move |&lon| (lat, lon)))
                    .map(|(lat, lon)| f(t, lat, lon))
                    .collect()
            })
            .collect();
        self.insert(name, steps);
        self
    }

    fn insert(&mut self, name: &str, steps: Vec<Vec<f32>>) {
        if !self.fields.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.fields.insert(name.to_string(), steps);
    }
}

#[async_trait]
impl ForecastDataset for MemoryDataset {
    fn cycle(&self) -> ForecastCycle {
        self.cycle
    }

    fn axes(&self) -> &GridAxes {
        &self.axes
    }

    fn has_variable(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    fn variables(&self) -> Vec<String> {
        self.order.clone()
    }

    async fn read(
        &self,
        variable: &str,
        time_index: usize,
        window: &GridWindow,
    ) -> ViewerResult<GridSlice> {
        let steps = self
            .fields
            .get(variable)
            .ok_or_else(|| ViewerError::DataFieldMissing(variable.to_string()))?;
        let grid = steps
            .get(time_index)
            .ok_or(ForecastUnavailable::LeadHourOutOfRange {
                requested: time_index,
                available: steps.len(),
            })?;

        if window.is_empty()
            || window.lat.end > self.axes.lats.len()
            || window.lon.end > self.axes.lons.len()
        {
            return Err(ViewerError::InvalidParameter {
                param: "window".to_string(),
                message: format!("{:?} is outside the grid", window),
            });
        }

        let full = GridSlice::new(self.axes.lats.clone(), self.axes.lons.clone(), grid.clone());
        Ok(full.window(window))
    }
}

/// Serves a fixed set of in-memory datasets and counts open calls.
#[derive(Default)]
pub struct MemoryProvider {
    datasets: HashMap<ForecastCycle, Arc<MemoryDataset>>,
    opens: AtomicUsize,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(mut self, dataset: MemoryDataset) -> Self {
        self.datasets.insert(dataset.cycle, Arc::new(dataset));
        self
    }

    /// Number of `open` calls so far, including failed ones.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DatasetProvider for MemoryProvider {
    async fn open(&self, cycle: ForecastCycle) -> ViewerResult<Arc<dyn ForecastDataset>> {
        self.opens.fetch_add(1, Ordering::Relaxed);
        match self.datasets.get(&cycle) {
            Some(dataset) => Ok(dataset.clone() as Arc<dyn ForecastDataset>),
            None => Err(ViewerError::source_unavailable(cycle, "no such dataset")),
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use forecast_common::{BoundingBox, RunHour};
    use test_utils::{axis, create_test_grid};

    fn cycle() -> ForecastCycle {
        ForecastCycle::new(NaiveDate::from_ymd_opt(2025, 7, 13).unwrap(), RunHour::Z00)
    }

    fn dataset() -> MemoryDataset {
        let axes = GridAxes::new(
            vec![cycle().reference_time(); 2],
            axis(-3.0, 0.25, 9),
            axis(113.5, 0.25, 11),
        );
        MemoryDataset::new(cycle(), axes)
            .with_field("field", vec![create_test_grid(11, 9), create_test_grid(11, 9)])
            .unwrap()
    }

    #[tokio::test]
    async fn test_read_window() {
        let dataset = dataset();
        let window = dataset
            .axes()
            .select(&BoundingBox::new(114.0, -2.5, 114.5, -2.0))
            .unwrap();
        let slice = dataset.read("field", 1, &window).await.unwrap();
        assert_eq!(slice.lons, vec![114.0, 114.25, 114.5]);
        assert_eq!(slice.lats, vec![-2.5, -2.25, -2.0]);
        // col 2, row 2 of the full grid
        assert_eq!(slice.values[0], 2002.0);
    }

    #[tokio::test]
    async fn test_missing_variable_and_time() {
        let dataset = dataset();
        let window = GridWindow { lat: 0..1, lon: 0..1 };
        assert!(matches!(
            dataset.read("tmp2m", 0, &window).await,
            Err(ViewerError::DataFieldMissing(name)) if name == "tmp2m"
        ));
        assert!(matches!(
            dataset.read("field", 2, &window).await,
            Err(ViewerError::ForecastUnavailable(ForecastUnavailable::LeadHourOutOfRange {
                requested: 2,
                available: 2
            }))
        ));
    }

    #[test]
    fn test_with_field_validates_shape() {
        let axes = GridAxes::new(vec![cycle().reference_time()], axis(0.0, 1.0, 2), axis(0.0, 1.0, 2));
        let result = MemoryDataset::new(cycle(), axes).with_field("x", vec![vec![0.0; 3]]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_provider_counts_opens() {
        let provider = MemoryProvider::new().with_dataset(dataset());
        assert!(provider.open(cycle()).await.is_ok());

        let other = ForecastCycle::new(cycle().date, RunHour::Z12);
        let err = provider.open(other).await.err().unwrap();
        assert_eq!(err.kind(), "SourceUnavailable");
        assert_eq!(provider.open_count(), 2);
    }
}
