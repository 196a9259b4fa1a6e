//! Storage for opened forecast datasets.
//!
//! Provides [`DatasetCache`], the memoization layer between the panel
//! renderer and a [`forecast_common::DatasetProvider`].

pub mod dataset_cache;

pub use dataset_cache::{DatasetCache, DatasetCacheStats, EvictionPolicy};
