//! Unit conversions from raw dataset variables to displayed quantities.

use forecast_common::{GridSlice, ViewerError, ViewerResult};

/// Conversion applied to the variables a parameter reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conversion {
    /// `value × factor` (precipitation rate per second to per hour)
    Multiply(f32),
    /// `value − offset` (kelvin to °C)
    Subtract(f32),
    /// `value ÷ divisor` (Pa to hPa)
    Divide(f32),
    /// `√(u² + v²) × factor` over two component fields
    Magnitude { factor: f32 },
}

impl Conversion {
    /// Number of input fields the conversion takes.
    pub fn arity(&self) -> usize {
        match self {
            Conversion::Magnitude { .. } => 2,
            _ => 1,
        }
    }

    /// Convert a single value (or a u/v pair for `Magnitude`).
    pub fn apply_value(&self, value: f32, other: f32) -> f32 {
        match *self {
            Conversion::Multiply(factor) => value * factor,
            Conversion::Subtract(offset) => value - offset,
            Conversion::Divide(divisor) => value / divisor,
            Conversion::Magnitude { factor } => value.hypot(other) * factor,
        }
    }

    /// Convert whole fields. `inputs` must hold [`Conversion::arity`] slices
    /// on the same grid.
    pub fn apply(&self, inputs: &[GridSlice]) -> ViewerResult<GridSlice> {
        match (self, inputs) {
            (Conversion::Magnitude { .. }, [u, v]) => u
                .zip_with(v, |a, b| self.apply_value(a, b))
                .ok_or_else(|| ViewerError::RenderError("vector components are on different grids".to_string())),
            (Conversion::Magnitude { .. }, _) => Err(arity_error(2, inputs.len())),
            (_, [field]) => Ok(field.map(|v| self.apply_value(v, 0.0))),
            _ => Err(arity_error(1, inputs.len())),
        }
    }
}

fn arity_error(expected: usize, got: usize) -> ViewerError {
    ViewerError::RenderError(format!("conversion takes {} field(s), got {}", expected, got))
}

/// A field ready to draw, with the raw wind components kept for barbs.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedField {
    pub field: GridSlice,
    pub components: Option<(GridSlice, GridSlice)>,
}

impl DerivedField {
    /// Convert the raw variables; two inputs are kept as vector components.
    pub fn derive(conversion: Conversion, mut inputs: Vec<GridSlice>) -> ViewerResult<Self> {
        let field = conversion.apply(&inputs)?;
        let components = if inputs.len() == 2 {
            let v = inputs.pop();
            let u = inputs.pop();
            u.zip(v)
        } else {
            None
        };
        Ok(Self { field, components })
    }
}
