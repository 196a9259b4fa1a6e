//! Static decoration for every panel: boundary layers, marker and font.
//!
//! Everything here is best-effort. A missing shapefile or font is logged
//! once at startup and the panel is drawn without it.

use std::path::PathBuf;

use renderer::{BoundaryLayer, FeatureFilter, Marker, TextRenderer};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Natural Earth admin-0 boundary lines, relative to the working directory.
pub const DEFAULT_BORDERS_PATH: &str = "data/ne_10m_admin_0_boundary_lines_land.shp";

/// Default font location on Debian-based systems.
pub const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

/// Administrative outline: a shapefile plus an optional attribute filter
/// picking the region of interest out of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminBoundaryConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub filter: Option<FeatureFilter>,
}

/// Overlay settings as they appear in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// National borders shapefile, drawn dotted. An unreadable file falls
    /// back to the built-in lines; `null` disables borders.
    pub borders: Option<PathBuf>,
    pub admin: Option<AdminBoundaryConfig>,
    pub marker: Option<Marker>,
    /// Land/sea mask variable for land shading and the coastline
    pub land_variable: Option<String>,
    pub font: Option<PathBuf>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            borders: Some(PathBuf::from(DEFAULT_BORDERS_PATH)),
            admin: None,
            marker: Some(Marker {
                lon: 114.85,
                lat: -1.71,
                label: "Buntok".to_string(),
            }),
            land_variable: Some("landsfc".to_string()),
            font: Some(PathBuf::from(DEFAULT_FONT_PATH)),
        }
    }
}

/// Loaded overlays, shared by every render.
#[derive(Debug, Default)]
pub struct PanelOverlays {
    pub borders: Option<BoundaryLayer>,
    pub admin: Option<BoundaryLayer>,
    pub marker: Option<Marker>,
    pub land_variable: Option<String>,
    pub text: Option<TextRenderer>,
}

impl PanelOverlays {
    /// Load what the config names, skipping anything that fails.
    pub fn load(config: &OverlayConfig) -> Self {
        let borders = config.borders.as_ref().map(|path| {
            BoundaryLayer::from_shapefile(path, None).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Border shapefile unavailable, using built-in borders");
                BoundaryLayer::builtin_borders()
            })
        });

        let admin = config.admin.as_ref().and_then(|admin| {
            BoundaryLayer::from_shapefile(&admin.path, admin.filter.as_ref())
                .map_err(|e| warn!(path = %admin.path.display(), error = %e, "Admin overlay unavailable"))
                .ok()
                .filter(|layer| !layer.is_empty())
        });

        let text = config.font.as_ref().and_then(|path| {
            TextRenderer::load(path)
                .map_err(|e| warn!(path = %path.display(), error = %e, "Font unavailable, panels will have no text"))
                .ok()
        });

        info!(
            borders = borders.is_some(),
            admin = admin.is_some(),
            marker = config.marker.is_some(),
            font = text.is_some(),
            "Loaded panel overlays"
        );

        Self {
            borders,
            admin,
            marker: config.marker.clone(),
            land_variable: config.land_variable.clone(),
            text,
        }
    }
}
