//! Shared test utilities for the GFS panel viewer workspace.
//!
//! - Synthetic field generators in raw GFS units
//! - Fixtures: regions, cycle times, OPeNDAP response bodies, panel queries
//! - Helpers for locating optional assets (fonts, shapefiles)
//! - Approximate-equality assertion macros
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Skip a test when an optional asset is not available.
///
/// ```ignore
/// use test_utils::require_test_file;
///
/// #[test]
/// fn test_admin_outline() {
///     let path = require_test_file!("admin_regions.shp");
///     // ...
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: Test file '{}' not found. Set TEST_DATA_DIR to enable this test.",
                    $name
                );
                return;
            }
        }
    }};
}

/// Skip a test when no TrueType font can be found.
#[macro_export]
macro_rules! require_test_font {
    () => {{
        match $crate::find_test_font() {
            Some(path) => path,
            None => {
                eprintln!("SKIPPED: no TrueType font found. Set TEST_FONT to enable this test.");
                return;
            }
        }
    }};
}

/// Approximate floating-point equality.
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Approximate equality of every element of two float slices.
#[macro_export]
macro_rules! assert_slice_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left = &$left;
        let right = &$right;
        assert_eq!(left.len(), right.len(), "slice lengths differ");
        for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
            let (l, r) = (*l as f64, *r as f64);
            if (l.is_nan() && r.is_nan()) || (l - r).abs() <= $epsilon as f64 {
                continue;
            }
            panic!(
                "assertion failed: slices differ at index {}\n  left: `{:?}`,\n right: `{:?}`",
                i, l, r
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_slice_approx_eq_treats_nan_as_equal() {
        assert_slice_approx_eq!([1.0f32, f32::NAN], [1.00001f32, f32::NAN], 0.001);
    }

    #[test]
    #[should_panic(expected = "index 1")]
    fn test_assert_slice_approx_eq_reports_index() {
        assert_slice_approx_eq!([1.0f64, 2.0], [1.0f64, 3.0], 0.001);
    }
}
