//! Forecast cycle identifiers and valid-time labels.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

/// Model run cycles (GFS runs 4x daily).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RunHour {
    /// 00Z run
    #[serde(rename = "00")]
    Z00,
    /// 06Z run
    #[serde(rename = "06")]
    Z06,
    /// 12Z run
    #[serde(rename = "12")]
    Z12,
    /// 18Z run
    #[serde(rename = "18")]
    Z18,
}

impl RunHour {
    pub fn from_hour(hour: u32) -> Option<Self> {
        match hour {
            0 => Some(RunHour::Z00),
            6 => Some(RunHour::Z06),
            12 => Some(RunHour::Z12),
            18 => Some(RunHour::Z18),
            _ => None,
        }
    }

    pub fn hour(&self) -> u32 {
        match self {
            RunHour::Z00 => 0,
            RunHour::Z06 => 6,
            RunHour::Z12 => 12,
            RunHour::Z18 => 18,
        }
    }

    /// Two-digit token used in dataset URLs ("00", "06", "12", "18").
    pub fn token(&self) -> String {
        format!("{:02}", self.hour())
    }

    pub fn all() -> &'static [RunHour] {
        &[RunHour::Z00, RunHour::Z06, RunHour::Z12, RunHour::Z18]
    }
}

impl std::str::FromStr for RunHour {
    type Err = ViewerError;

    /// Accepts "00", "0", "06z", "12Z" and so on.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches(['z', 'Z']);
        trimmed
            .parse::<u32>()
            .ok()
            .and_then(RunHour::from_hour)
            .ok_or_else(|| ViewerError::InvalidParameter {
                param: "hour".to_string(),
                message: format!("'{}' is not one of 00, 06, 12, 18", s),
            })
    }
}

/// A model initialization cycle: run date plus run hour.
///
/// This is the key the dataset cache memoizes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForecastCycle {
    pub date: NaiveDate,
    pub hour: RunHour,
}

impl ForecastCycle {
    pub fn new(date: NaiveDate, hour: RunHour) -> Self {
        Self { date, hour }
    }

    /// Parse a run date given as `YYYY-MM-DD` or `YYYYMMDD`.
    pub fn parse_date(s: &str) -> Result<NaiveDate, ViewerError> {
        let s = s.trim();
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
            .map_err(|_| ViewerError::InvalidParameter {
                param: "date".to_string(),
                message: format!("'{}' is not a YYYY-MM-DD date", s),
            })
    }

    /// Run date formatted as `YYYYMMDD`.
    pub fn date_token(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }

    /// Model initialization time.
    pub fn reference_time(&self) -> DateTime<Utc> {
        let naive = self
            .date
            .and_hms_opt(self.hour.hour(), 0, 0)
            .unwrap_or_default();
        Utc.from_utc_datetime(&naive)
    }
}

impl std::fmt::Display for ForecastCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gfs {} {}z", self.date_token(), self.hour.token())
    }
}

/// Absolute valid time label, e.g. "00UTC Sun 13 Jul 2025".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTimeLabel(String);

impl ValidTimeLabel {
    pub fn from_datetime(valid: DateTime<Utc>) -> Self {
        Self(valid.format("%HUTC %a %d %b %Y").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ValidTimeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Zero-padded lead offset label, e.g. "t+000".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadLabel(String);

impl LeadLabel {
    pub fn from_index(lead_index: usize) -> Self {
        Self(format!("t+{:03}", lead_index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LeadLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_hour_parsing() {
        assert_eq!("00".parse::<RunHour>().unwrap(), RunHour::Z00);
        assert_eq!("6".parse::<RunHour>().unwrap(), RunHour::Z06);
        assert_eq!("12z".parse::<RunHour>().unwrap(), RunHour::Z12);
        assert!("03".parse::<RunHour>().is_err());
        assert!("noon".parse::<RunHour>().is_err());
    }

    #[test]
    fn test_cycle_tokens() {
        let date = ForecastCycle::parse_date("2025-07-13").unwrap();
        let cycle = ForecastCycle::new(date, RunHour::Z06);
        assert_eq!(cycle.date_token(), "20250713");
        assert_eq!(cycle.hour.token(), "06");
        assert_eq!(cycle.to_string(), "gfs 20250713 06z");
        assert_eq!(
            cycle.reference_time(),
            Utc.with_ymd_and_hms(2025, 7, 13, 6, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_compact_date() {
        let date = ForecastCycle::parse_date("20250713").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 7, 13).unwrap());
        assert!(ForecastCycle::parse_date("13/07/2025").is_err());
    }

    #[test]
    fn test_valid_time_label() {
        let label = ValidTimeLabel::from_datetime(Utc.with_ymd_and_hms(2025, 7, 13, 0, 0, 0).unwrap());
        assert_eq!(label.as_str(), "00UTC Sun 13 Jul 2025");
    }

    #[test]
    fn test_lead_label_zero_padded() {
        assert_eq!(LeadLabel::from_index(0).as_str(), "t+000");
        assert_eq!(LeadLabel::from_index(42).as_str(), "t+042");
        assert_eq!(LeadLabel::from_index(240).as_str(), "t+240");
    }
}
