//! Shared test utilities for the analysis acquisition workspace.
//!
//! Synthetic grids and stations, canned upstream payloads and config
//! snippets, temporary files, and an approximate-equality assertion.
//!
//! ```ignore
//! use test_utils::{paired_stations, regions, test_instant};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Assert that two numbers are within `tolerance` of each other.
///
/// Operands are widened to `f64`, so `f32` grid values and `f64`
/// coordinates can be compared directly.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let (left, right, tolerance) = ($left as f64, $right as f64, $tolerance as f64);
        assert!(
            (left - right).abs() <= tolerance,
            "assertion failed: {} is not within {} of {} (off by {})",
            left,
            tolerance,
            right,
            (left - right).abs()
        );
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_approx_eq_within_tolerance() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(297.4_f32, 297.4_f64, 1e-4);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "is not within")]
    fn test_approx_eq_outside_tolerance() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }
}
