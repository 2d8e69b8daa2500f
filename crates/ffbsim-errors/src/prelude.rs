//! Glob import for crates that return simulator errors.
//!
//! ```
//! use ffbsim_errors::prelude::*;
//! use ffbsim_errors::validate_range;
//!
//! fn poll_interval(ms: u64) -> Result<u64> {
//!     validate_range!("poll_interval_ms", ms, 1, 1_000);
//!     Ok(ms)
//! }
//!
//! assert_eq!(poll_interval(16).ok(), Some(16));
//! assert!(matches!(poll_interval(0), Err(FfbSimError::Validation(_))));
//! ```

pub use crate::{
    DeviceResult, Result,
    common::{ErrorClass, ErrorSeverity, FfbSimError},
    device::DeviceError,
    session::{CatalogError, InitError, PlayError},
    validation::ValidationError,
};

/// Return early with `$error` unless `$condition` holds.
#[macro_export]
macro_rules! validate {
    ($condition:expr, $error:expr) => {
        if !$condition {
            return Err($error.into());
        }
    };
}

/// Return early with an out of range error unless `$min <= $value <= $max`.
///
/// NaN is never in range.
#[macro_export]
macro_rules! validate_range {
    ($field:expr, $value:expr, $min:expr, $max:expr) => {
        if !($min..=$max).contains(&$value) {
            return Err($crate::ValidationError::out_of_range($field, $value, $min, $max).into());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_macro() {
        fn check() -> Result<()> {
            validate!(false, ValidationError::required("effects"));
            Ok(())
        }
        assert!(matches!(check(), Err(FfbSimError::Validation(_))));
    }

    #[test]
    fn test_validate_range_rejects_nan() {
        fn check(value: f32) -> Result<()> {
            validate_range!("initial_intensity", value, -1.0_f32, 1.0_f32);
            Ok(())
        }
        assert!(check(0.5).is_ok());
        assert!(check(1.5).is_err());
        assert!(check(f32::NAN).is_err());
    }
}
