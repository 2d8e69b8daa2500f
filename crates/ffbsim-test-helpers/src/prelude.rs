//! Convenience re-exports for common test utilities.
//!
//! ```rust,ignore
//! use ffbsim_test_helpers::prelude::*;
//! ```

pub use crate::must::{must, must_some};
pub use crate::wait::wait_until;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
