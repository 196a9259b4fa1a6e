//! Parsers for the OPeNDAP responses served by the GrADS data server.
//!
//! Only the text encodings are used: the `.dds` structure description and
//! the `.ascii` value dumps.

mod ascii;
mod dds;
mod time;

pub use ascii::{parse_ascii, AsciiArray};
pub use dds::{parse_dds, DdsVariable};
pub use time::{datetime_to_grads_days, grads_days_to_datetime};

use crate::error::{SourceError, SourceResult};

/// GrADS writes missing values as 9.999e20.
pub const GRADS_FILL_THRESHOLD: f64 = 1e20;

/// Reject OPeNDAP error documents (`Error { code = ...; message = "..."; };`).
pub(crate) fn check_error_document(body: &str) -> SourceResult<()> {
    let trimmed = body.trim_start();
    if trimmed.starts_with("Error") || trimmed.starts_with("<html") || trimmed.starts_with("<!DOCTYPE") {
        let message = trimmed
            .lines()
            .find_map(|line| {
                line.trim()
                    .strip_prefix("message = ")
                    .map(|m| m.trim_end_matches(';').trim_matches('"').to_string())
            })
            .unwrap_or_else(|| trimmed.lines().next().unwrap_or_default().to_string());
        return Err(SourceError::ServerError(message));
    }
    Ok(())
}
