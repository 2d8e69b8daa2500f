//! Float comparison for tests.

#[doc(hidden)]
#[track_caller]
pub fn check_approx(left: f64, right: f64, tolerance: f64, note: std::fmt::Arguments<'_>) {
    let diff = (left - right).abs();
    // NaN never compares within tolerance
    if diff.is_nan() || diff > tolerance {
        panic!("assertion failed: {left} ≈ {right} (diff {diff}, tolerance {tolerance}){note}");
    }
}

/// Fails unless `|left - right| <= tolerance`. Accepts `f32` or `f64`.
///
/// ```rust
/// use ffbsim_test_helpers::assert_approx_eq;
///
/// assert_approx_eq!(0.5_f32 + 0.05 + 0.05 + 0.05, 0.65, 1e-6);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr $(,)?) => {
        $crate::assertions::check_approx(
            f64::from($left),
            f64::from($right),
            f64::from($tolerance),
            format_args!(""),
        )
    };
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {
        $crate::assertions::check_approx(
            f64::from($left),
            f64::from($right),
            f64::from($tolerance),
            format_args!(": {}", format_args!($($arg)+)),
        )
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_within_tolerance() {
        assert_approx_eq!(1.0_f64, 1.0001, 0.001);
        assert_approx_eq!(0.65_f32, 0.65_f32, 1e-6_f32);
    }

    #[test]
    #[should_panic(expected = "intensity after three steps")]
    fn test_outside_tolerance_shows_note() {
        assert_approx_eq!(0.5_f32, 0.65_f32, 1e-6_f32, "intensity after three steps");
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_nan_never_matches() {
        assert_approx_eq!(f64::NAN, f64::NAN, 1.0);
    }
}
