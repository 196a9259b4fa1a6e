//! Error types for the panel viewer.

use thiserror::Error;

use crate::BoundingBox;

/// Result type alias using ViewerError.
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Why a forecast slice cannot be shown.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastUnavailable {
    #[error("lead-hour index {requested} is out of range (dataset has {available} time steps)")]
    LeadHourOutOfRange { requested: usize, available: usize },

    #[error("region {region} does not intersect the dataset coverage")]
    EmptyRegion { region: BoundingBox },
}

/// Primary error type for a single render attempt.
///
/// None of these is fatal to the process; each one aborts the current
/// render and is reported to the status area.
#[derive(Debug, Error)]
pub enum ViewerError {
    // === Data source ===
    #[error("Data source unavailable for {cycle}: {cause}")]
    SourceUnavailable { cycle: String, cause: String },

    #[error("Forecast unavailable: {0}")]
    ForecastUnavailable(#[from] ForecastUnavailable),

    #[error("Variable '{0}' is missing from the dataset")]
    DataFieldMissing(String),

    // === Request ===
    #[error("Unrecognized parameter: {0}")]
    UnrecognizedParameter(String),

    #[error("Invalid value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Rendering ===
    #[error("Rendering failed: {0}")]
    RenderError(String),
}

impl ViewerError {
    /// Build a `SourceUnavailable` from any displayable cause.
    pub fn source_unavailable(cycle: impl ToString, cause: impl std::fmt::Display) -> Self {
        ViewerError::SourceUnavailable {
            cycle: cycle.to_string(),
            cause: cause.to_string(),
        }
    }

    /// Stable machine-readable name of the condition.
    pub fn kind(&self) -> &'static str {
        match self {
            ViewerError::SourceUnavailable { .. } => "SourceUnavailable",
            ViewerError::ForecastUnavailable(_) => "ForecastUnavailable",
            ViewerError::DataFieldMissing(_) => "DataFieldMissing",
            ViewerError::UnrecognizedParameter(_) => "UnrecognizedParameter",
            ViewerError::InvalidParameter { .. } => "InvalidParameter",
            ViewerError::RenderError(_) => "RenderError",
        }
    }

    /// Short human-readable message for the UI status area.
    pub fn user_message(&self) -> String {
        match self {
            ViewerError::SourceUnavailable { cycle, .. } => {
                format!("Gagal memuat data GFS {}. Coba lagi nanti.", cycle)
            }
            ViewerError::ForecastUnavailable(ForecastUnavailable::LeadHourOutOfRange {
                requested,
                available,
            }) => format!(
                "Forecast t+{:03} tidak tersedia (maksimum indeks {}).",
                requested,
                available.saturating_sub(1)
            ),
            ViewerError::ForecastUnavailable(ForecastUnavailable::EmptyRegion { region }) => {
                format!("Wilayah {} berada di luar cakupan data.", region)
            }
            ViewerError::DataFieldMissing(name) => {
                format!("Variabel '{}' tidak ditemukan dalam dataset.", name)
            }
            ViewerError::UnrecognizedParameter(name) => {
                format!("Parameter '{}' tidak dikenali.", name)
            }
            ViewerError::InvalidParameter { param, message } => {
                format!("Input '{}' tidak valid: {}", param, message)
            }
            ViewerError::RenderError(_) => "Gagal membuat peta.".to_string(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ViewerError::UnrecognizedParameter(_) | ViewerError::InvalidParameter { .. } => 400,
            ViewerError::ForecastUnavailable(_) | ViewerError::DataFieldMissing(_) => 404,
            ViewerError::SourceUnavailable { .. } => 502,
            ViewerError::RenderError(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_hour_message_names_index() {
        let err = ViewerError::from(ForecastUnavailable::LeadHourOutOfRange {
            requested: 241,
            available: 129,
        });
        assert_eq!(err.kind(), "ForecastUnavailable");
        assert!(err.to_string().contains("241"));
        assert!(err.user_message().contains("t+241"));
        assert_eq!(err.http_status_code(), 404);
    }

    #[test]
    fn test_source_unavailable_keeps_cause() {
        let err = ViewerError::source_unavailable("gfs 20250713 00z", "connection refused");
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.http_status_code(), 502);
    }
}
