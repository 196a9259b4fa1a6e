//! Common types and utilities shared across the GFS panel viewer crates.

pub mod bbox;
pub mod dataset;
pub mod error;
pub mod grid;
pub mod parameter;
pub mod time;

pub use bbox::BoundingBox;
pub use dataset::{DatasetProvider, ForecastDataset};
pub use error::{ForecastUnavailable, ViewerError, ViewerResult};
pub use grid::{GridAxes, GridSlice, GridWindow};
pub use parameter::Parameter;
pub use time::{ForecastCycle, LeadLabel, RunHour, ValidTimeLabel};
