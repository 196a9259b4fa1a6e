//! Form/query input parsing.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use forecast_common::{ForecastCycle, Parameter, RunHour, ViewerError, ViewerResult};

/// Highest lead index the form offers. The dataset's own time axis is the
/// real bound and is checked at render time.
pub const MAX_LEAD_INDEX: usize = 240;

/// Raw query string, as submitted by the form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PanelQuery {
    pub date: Option<String>,
    pub hour: Option<String>,
    pub lead: Option<String>,
    pub parameter: Option<String>,
    #[serde(default)]
    pub download: bool,
}

/// A validated selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PanelRequest {
    pub cycle: ForecastCycle,
    pub lead_index: usize,
    pub parameter: Parameter,
}

impl PanelQuery {
    /// Validate the inputs. Date defaults to today (UTC), hour to 00 and
    /// lead to 0; a missing parameter is unrecognized like any other.
    pub fn parse(&self) -> ViewerResult<PanelRequest> {
        self.parse_with_today(Utc::now().date_naive())
    }

    pub fn parse_with_today(&self, today: NaiveDate) -> ViewerResult<PanelRequest> {
        let date = match non_empty(&self.date) {
            Some(s) => ForecastCycle::parse_date(s)?,
            None => today,
        };
        let hour = match non_empty(&self.hour) {
            Some(s) => s.parse::<RunHour>()?,
            None => RunHour::Z00,
        };
        let lead_index = match non_empty(&self.lead) {
            Some(s) => s.trim().parse::<usize>().map_err(|_| ViewerError::InvalidParameter {
                param: "lead".to_string(),
                message: format!("'{}' is not a non-negative integer", s),
            })?,
            None => 0,
        };
        let parameter = non_empty(&self.parameter).unwrap_or_default().parse::<Parameter>()?;

        Ok(PanelRequest {
            cycle: ForecastCycle::new(date, hour),
            lead_index,
            parameter,
        })
    }
}

impl PanelRequest {
    /// Query string reproducing this request.
    pub fn query_string(&self) -> String {
        format!(
            "date={}&hour={}&lead={}&parameter={}",
            self.cycle.date.format("%Y-%m-%d"),
            self.cycle.hour.token(),
            self.lead_index,
            self.parameter.id()
        )
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(date: &str, hour: &str, lead: &str, parameter: &str) -> PanelQuery {
        PanelQuery {
            date: Some(date.to_string()),
            hour: Some(hour.to_string()),
            lead: Some(lead.to_string()),
            parameter: Some(parameter.to_string()),
            download: false,
        }
    }

    #[test]
    fn test_parse_full_query() {
        let request = query("2025-07-13", "00", "0", "precip").parse().unwrap();
        assert_eq!(request.cycle.date_token(), "20250713");
        assert_eq!(request.cycle.hour, RunHour::Z00);
        assert_eq!(request.lead_index, 0);
        assert_eq!(request.parameter, Parameter::PrecipitationRate);
        assert_eq!(request.query_string(), "date=2025-07-13&hour=00&lead=0&parameter=precip");
    }

    #[test]
    fn test_defaults() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 13).unwrap();
        let q = PanelQuery {
            parameter: Some("Suhu 2m (°C)".to_string()),
            ..PanelQuery::default()
        };
        let request = q.parse_with_today(today).unwrap();
        assert_eq!(request.cycle, ForecastCycle::new(today, RunHour::Z00));
        assert_eq!(request.lead_index, 0);
        assert_eq!(request.parameter, Parameter::Temperature2m);
    }

    #[test]
    fn test_lead_beyond_form_range_still_parses() {
        let request = query("2025-07-13", "06", "241", "wind").parse().unwrap();
        assert_eq!(request.lead_index, MAX_LEAD_INDEX + 1);
    }

    #[test]
    fn test_missing_or_unknown_parameter_is_unrecognized() {
        let mut q = query("2025-07-13", "00", "0", "humidity");
        assert_eq!(q.parse().unwrap_err().kind(), "UnrecognizedParameter");
        q.parameter = None;
        assert_eq!(q.parse().unwrap_err().kind(), "UnrecognizedParameter");
    }

    #[test]
    fn test_bad_inputs_are_invalid() {
        for q in [
            query("13/07/2025", "00", "0", "precip"),
            query("2025-07-13", "03", "0", "precip"),
            query("2025-07-13", "00", "-1", "precip"),
        ] {
            assert_eq!(q.parse().unwrap_err().kind(), "InvalidParameter");
        }
    }
}
