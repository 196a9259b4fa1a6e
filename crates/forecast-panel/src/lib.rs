//! Forecast panel rendering.
//!
//! Turns one (cycle, lead-hour index, parameter) selection into a labeled
//! map image:
//! - [`table`]: which variables each parameter reads and how it is drawn
//! - [`derive`]: unit conversions and wind speed
//! - [`overlays`]: boundaries, location marker and font, loaded once
//! - [`panel`]: the render pipeline and the download filename

pub mod derive;
pub mod overlays;
pub mod panel;
pub mod table;

pub use derive::{Conversion, DerivedField};
pub use overlays::{AdminBoundaryConfig, OverlayConfig, PanelOverlays};
pub use panel::{download_filename, PanelRenderer, PanelSettings, RenderedPanel};
pub use table::{PanelStyle, ParameterSpec};
