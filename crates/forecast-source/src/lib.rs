//! Forecast data sources.
//!
//! - [`NomadsProvider`]: live GFS cycles from the NOMADS GrADS data server
//! - [`SyntheticProvider`]: deterministic offline demo data
//! - [`MemoryProvider`] / [`MemoryDataset`]: in-memory datasets for tests

pub mod error;
pub mod memory;
pub mod nomads;
pub mod opendap;
pub mod synthetic;

pub use error::{SourceError, SourceResult};
pub use memory::{MemoryDataset, MemoryProvider};
pub use nomads::{NomadsConfig, NomadsDataset, NomadsProvider, DEFAULT_BASE_URL};
pub use synthetic::{SyntheticConfig, SyntheticProvider};
