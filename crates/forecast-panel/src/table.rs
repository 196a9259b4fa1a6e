//! Parameter lookup table.
//!
//! Each selectable parameter maps to one row: the dataset variables it
//! reads, the unit conversion, its label and units, and how it is drawn.

use forecast_common::Parameter;
use renderer::Colormap;

use crate::derive::Conversion;

/// How a derived field is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelStyle {
    /// Pseudo-color mesh over a fixed value range, optionally discretized
    /// into `bins` bands, with barbs on top when `barbs` is set.
    Shaded {
        colormap: Colormap,
        min: f32,
        max: f32,
        bins: Option<usize>,
        barbs: bool,
    },
    /// Unfilled labeled isolines every `interval`, levels from the data.
    Contours { interval: f32 },
}

/// One row of the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    pub parameter: Parameter,
    /// Dataset variables, in the order the conversion expects them
    pub variables: &'static [&'static str],
    pub conversion: Conversion,
    pub label: &'static str,
    pub units: &'static str,
    pub style: PanelStyle,
}

impl ParameterSpec {
    /// "{label} ({units})", used for the colorbar caption and the title.
    pub fn caption(&self) -> String {
        format!("{} ({})", self.label, self.units)
    }
}

/// Knots per metre per second.
pub const MS_TO_KNOTS: f32 = 1.94384;

/// Kelvin at 0 °C.
pub const KELVIN_OFFSET: f32 = 273.15;

static TABLE: [ParameterSpec; 4] = [
    ParameterSpec {
        parameter: Parameter::PrecipitationRate,
        variables: &["pratesfc"],
        conversion: Conversion::Multiply(3600.0),
        label: "Curah Hujan",
        units: "mm/jam",
        style: PanelStyle::Shaded {
            colormap: Colormap::Rain,
            min: 0.0,
            max: 10.0,
            bins: None,
            barbs: false,
        },
    },
    ParameterSpec {
        parameter: Parameter::Temperature2m,
        variables: &["tmp2m"],
        conversion: Conversion::Subtract(KELVIN_OFFSET),
        label: "Suhu 2m",
        units: "°C",
        style: PanelStyle::Shaded {
            colormap: Colormap::Diverging,
            min: 20.0,
            max: 35.0,
            bins: None,
            barbs: false,
        },
    },
    ParameterSpec {
        parameter: Parameter::Wind10m,
        variables: &["ugrd10m", "vgrd10m"],
        conversion: Conversion::Magnitude { factor: MS_TO_KNOTS },
        label: "Kecepatan Angin 10m",
        units: "knot",
        style: PanelStyle::Shaded {
            colormap: Colormap::Wind,
            min: 0.0,
            max: 20.0,
            bins: Some(10),
            barbs: true,
        },
    },
    ParameterSpec {
        parameter: Parameter::MeanSeaLevelPressure,
        variables: &["prmslmsl"],
        conversion: Conversion::Divide(100.0),
        label: "Tekanan Permukaan Laut",
        units: "hPa",
        style: PanelStyle::Contours { interval: 2.0 },
    },
];

/// Row for a parameter.
pub fn lookup(parameter: Parameter) -> &'static ParameterSpec {
    match parameter {
        Parameter::PrecipitationRate => &TABLE[0],
        Parameter::Temperature2m => &TABLE[1],
        Parameter::Wind10m => &TABLE[2],
        Parameter::MeanSeaLevelPressure => &TABLE[3],
    }
}

/// Every row, in selector order.
pub fn all() -> &'static [ParameterSpec] {
    &TABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_returns_matching_row() {
        for parameter in Parameter::all() {
            assert_eq!(lookup(*parameter).parameter, *parameter);
        }
    }

    #[test]
    fn test_caption_matches_selector_text() {
        for spec in all() {
            assert_eq!(spec.caption(), spec.parameter.display_name());
        }
    }

    #[test]
    fn test_only_wind_reads_two_variables() {
        assert_eq!(lookup(Parameter::Wind10m).variables, &["ugrd10m", "vgrd10m"]);
        assert!(all()
            .iter()
            .filter(|s| s.parameter != Parameter::Wind10m)
            .all(|s| s.variables.len() == 1));
    }

    #[test]
    fn test_pressure_is_contoured() {
        assert_eq!(
            lookup(Parameter::MeanSeaLevelPressure).style,
            PanelStyle::Contours { interval: 2.0 }
        );
    }
}
