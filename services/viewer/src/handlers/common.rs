//! Shared response helpers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use forecast_common::ViewerError;

/// JSON error body: `{status: "error", kind, message, detail}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub kind: &'static str,
    /// Short message for the status area
    pub message: String,
    pub detail: String,
}

/// A [`ViewerError`] answered as JSON with its mapped status code.
#[derive(Debug)]
pub struct ApiError(pub ViewerError);

impl From<ViewerError> for ApiError {
    fn from(err: ViewerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let body = ErrorBody {
            status: "error",
            kind: self.0.kind(),
            message: self.0.user_message(),
            detail: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn status_for(err: &ViewerError) -> StatusCode {
    StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
        assert_eq!(escape_html("Suhu 2m (°C)"), "Suhu 2m (°C)");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ViewerError::UnrecognizedParameter("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ViewerError::source_unavailable("gfs 20250713 00z", "timeout")),
            StatusCode::BAD_GATEWAY
        );
    }
}
