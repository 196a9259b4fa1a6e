//! Abstractions over a remote gridded forecast dataset.
//!
//! A [`DatasetProvider`] opens one [`ForecastDataset`] per model cycle. Opening
//! reads only metadata (variable names and coordinate axes); values are
//! fetched lazily, one variable and one time step at a time, restricted to a
//! window of the grid.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{ForecastCycle, GridAxes, GridSlice, GridWindow, ViewerResult};

/// An opened forecast dataset for a single cycle.
#[async_trait]
pub trait ForecastDataset: Send + Sync {
    /// Cycle this dataset was opened for.
    fn cycle(&self) -> ForecastCycle;

    /// Coordinate axes (time, lat, lon).
    fn axes(&self) -> &GridAxes;

    /// Whether the dataset exposes a variable with this name.
    fn has_variable(&self, name: &str) -> bool;

    /// Variable names, in dataset order.
    fn variables(&self) -> Vec<String>;

    /// Read one time step of one variable restricted to `window`.
    ///
    /// Missing values come back as NaN.
    async fn read(
        &self,
        variable: &str,
        time_index: usize,
        window: &GridWindow,
    ) -> ViewerResult<GridSlice>;
}

/// Opens datasets by cycle.
#[async_trait]
pub trait DatasetProvider: Send + Sync {
    /// Open the dataset for a cycle, reading its metadata.
    ///
    /// Fails with `ViewerError::SourceUnavailable` when the dataset cannot
    /// be reached or parsed.
    async fn open(&self, cycle: ForecastCycle) -> ViewerResult<Arc<dyn ForecastDataset>>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
