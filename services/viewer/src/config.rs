//! Viewer configuration loaded from YAML.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use forecast_panel::PanelSettings;
use forecast_source::{NomadsConfig, SyntheticConfig};
use storage::EvictionPolicy;

/// Where datasets come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Live cycles from the NOMADS data server
    #[default]
    Nomads,
    /// Deterministic offline data
    Demo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub nomads: NomadsConfig,
    pub demo: SyntheticConfig,
}

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub listen: String,
    pub source: SourceConfig,
    pub cache: EvictionPolicy,
    pub panel: PanelSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
            source: SourceConfig::default(),
            cache: EvictionPolicy::Never,
            panel: PanelSettings::default(),
        }
    }
}

impl ViewerConfig {
    /// Load from a YAML file. A missing file gives the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read: {:?}", path))?;
        let config: ViewerConfig =
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse: {:?}", path))?;
        if !config.panel.region.is_valid() {
            bail!("Invalid panel region {} in {:?}", config.panel.region, path);
        }

        tracing::info!(
            path = %path.display(),
            source = ?config.source.kind,
            region = %config.panel.region,
            "Loaded viewer config"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::temp_test_dir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = ViewerConfig::load("/nonexistent/viewer.yaml").unwrap();
        assert_eq!(config.source.kind, SourceKind::Nomads);
        assert_eq!(config.cache, EvictionPolicy::Never);
        assert_eq!(config.listen, "0.0.0.0:8080");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = temp_test_dir();
        let path = dir.path().join("viewer.yaml");
        std::fs::write(
            &path,
            "source:\n  kind: demo\ncache:\n  kind: lru\n  capacity: 4\npanel:\n  figure:\n    width: 800\n",
        )
        .unwrap();

        let config = ViewerConfig::load(&path).unwrap();
        assert_eq!(config.source.kind, SourceKind::Demo);
        assert_eq!(config.cache, EvictionPolicy::Lru { capacity: 4 });
        assert_eq!(config.panel.figure.width, 800);
        assert_eq!(config.source.nomads.request_timeout_secs, 60);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = temp_test_dir();
        let path = dir.path().join("viewer.yaml");
        std::fs::write(&path, "cache: [not, a, policy]\n").unwrap();
        assert!(ViewerConfig::load(&path).is_err());
    }

    #[test]
    fn test_inverted_region_is_an_error() {
        let dir = temp_test_dir();
        let path = dir.path().join("viewer.yaml");
        std::fs::write(
            &path,
            "panel:\n  region: { min_x: 115.5, min_y: -1.0, max_x: 114.0, max_y: -2.5 }\n",
        )
        .unwrap();
        let err = ViewerConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid panel region"), "{}", err);
    }
}
