//! Error types for data source access.

use thiserror::Error;

use forecast_common::ViewerError;

/// Result type for data source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Why a request to the remote data server failed.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transport failure (DNS, connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The server answered with an OPeNDAP error document
    #[error("Server error: {0}")]
    ServerError(String),

    /// The response body could not be parsed
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

impl SourceError {
    /// Attach the cycle and convert to the viewer taxonomy.
    pub fn into_viewer_error(self, cycle: impl ToString) -> ViewerError {
        ViewerError::source_unavailable(cycle, self)
    }
}
