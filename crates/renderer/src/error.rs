//! Error types for figure rendering.

use thiserror::Error;

/// Result type alias using RenderError.
pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("font error: {0}")]
    Font(String),

    #[error("overlay error: {0}")]
    Overlay(String),

    #[error("nothing to draw: {0}")]
    EmptyField(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
