//! GrADS time axis conversion.
//!
//! GrADS reports time as fractional `days since 1-1-1 00:00:0.0` on a mixed
//! Julian/Gregorian calendar. For every date after 1582 that is the
//! proleptic Gregorian day count plus two.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

const CALENDAR_OFFSET_DAYS: f64 = 2.0;

fn epoch() -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Convert a GrADS day count to UTC, rounded to the nearest second.
pub fn grads_days_to_datetime(days: f64) -> Option<DateTime<Utc>> {
    if !days.is_finite() {
        return None;
    }
    let seconds = ((days - CALENDAR_OFFSET_DAYS) * 86_400.0).round() as i64;
    epoch()?.checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

/// Inverse of [`grads_days_to_datetime`].
pub fn datetime_to_grads_days(time: DateTime<Utc>) -> f64 {
    let seconds = epoch()
        .map(|epoch| (time - epoch).num_seconds())
        .unwrap_or_default();
    seconds as f64 / 86_400.0 + CALENDAR_OFFSET_DAYS
}
