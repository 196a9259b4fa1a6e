//! Map rendering for forecast panels.
//!
//! Implements the drawing styles a panel needs:
//! - Pseudo-color mesh with a colorbar
//! - Labeled contour lines (marching squares)
//! - Wind barbs
//! - Land, coastline and boundary overlays
//!
//! plus the figure layout around them and an in-house PNG encoder.

pub mod barbs;
pub mod contour;
pub mod error;
pub mod figure;
pub mod gradient;
pub mod map;
pub mod overlay;
pub mod png;
pub mod style;
pub mod text;

pub use error::{RenderError, RenderResult};
pub use figure::{FieldLayer, Figure, FigureStyle, Marker, RenderStats, RenderedFigure};
pub use overlay::{BoundaryLayer, FeatureFilter};
pub use style::{ColorScale, Colormap};
pub use text::TextRenderer;
