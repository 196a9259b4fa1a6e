//! Selectable forecast parameters.

use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

/// A user-selectable forecast parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    /// Surface precipitation rate
    PrecipitationRate,
    /// Temperature at 2 m
    Temperature2m,
    /// Wind at 10 m (speed shading plus barbs)
    Wind10m,
    /// Mean sea level pressure
    MeanSeaLevelPressure,
}

impl Parameter {
    pub fn all() -> &'static [Parameter] {
        &[
            Parameter::PrecipitationRate,
            Parameter::Temperature2m,
            Parameter::Wind10m,
            Parameter::MeanSeaLevelPressure,
        ]
    }

    /// Short identifier used in query strings and file names.
    pub fn id(&self) -> &'static str {
        match self {
            Parameter::PrecipitationRate => "precip",
            Parameter::Temperature2m => "t2m",
            Parameter::Wind10m => "wind",
            Parameter::MeanSeaLevelPressure => "mslp",
        }
    }

    /// Option text shown in the selector.
    pub fn display_name(&self) -> &'static str {
        match self {
            Parameter::PrecipitationRate => "Curah Hujan (mm/jam)",
            Parameter::Temperature2m => "Suhu 2m (°C)",
            Parameter::Wind10m => "Kecepatan Angin 10m (knot)",
            Parameter::MeanSeaLevelPressure => "Tekanan Permukaan Laut (hPa)",
        }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Parameter {
    type Err = ViewerError;

    /// Case-insensitive; accepts the short id, the GFS variable name, the
    /// selector text and a few common aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        if let Some(param) = Parameter::all()
            .iter()
            .find(|p| p.display_name().to_lowercase() == needle)
        {
            return Ok(*param);
        }

        match needle.as_str() {
            "precip" | "prate" | "pratesfc" | "precipitation" | "rain" => {
                Ok(Parameter::PrecipitationRate)
            }
            "t2m" | "tmp2m" | "temp" | "temperature" => Ok(Parameter::Temperature2m),
            "wind" | "wind10m" | "wind10" => Ok(Parameter::Wind10m),
            "mslp" | "prmsl" | "prmslmsl" | "pressure" => Ok(Parameter::MeanSeaLevelPressure),
            _ => Err(ViewerError::UnrecognizedParameter(s.to_string())),
        }
    }
}
