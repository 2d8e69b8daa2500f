//! Error types for the force-feedback wheel simulator
//!
//! Every failure the session can produce is classified twice: by
//! [`ErrorSeverity`] for logging, and by [`ErrorClass`] for propagation.
//!
//! - [`ErrorClass::Fatal`]: the device is absent or cannot be opened; the
//!   session never starts.
//! - [`ErrorClass::Degraded`]: one or more effect kinds were refused; the
//!   session starts with a reduced catalog.
//! - [`ErrorClass::Transient`]: acquisition loss or a missing download;
//!   recovered by retry logic, otherwise surfaced on the triggering call only.
//! - [`ErrorClass::Ignored`]: stop-command failures; logged and swallowed.
//!
//! # Modules
//!
//! - [`common`]: Top-level error and classification
//! - [`device`]: Failures reported by a native force-feedback backend
//! - [`session`]: Initialization, catalog and playback errors
//! - [`validation`]: Configuration validation errors
//!
//! # Example
//!
//! ```
//! use ffbsim_errors::prelude::*;
//!
//! fn check_intensity(value: f32) -> Result<f32> {
//!     if !(-1.0..=1.0).contains(&value) {
//!         return Err(ValidationError::out_of_range("intensity", value, -1.0, 1.0).into());
//!     }
//!     Ok(value)
//! }
//!
//! assert!(check_intensity(0.5).is_ok());
//! assert!(check_intensity(1.5).is_err());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod common;
pub mod device;
pub mod prelude;
pub mod session;
pub mod validation;

pub use common::{ErrorClass, ErrorSeverity, FfbSimError};
pub use device::DeviceError;
pub use session::{CatalogError, InitError, PlayError};
pub use validation::ValidationError;

/// A specialized `Result` type for simulator operations.
pub type Result<T> = std::result::Result<T, FfbSimError>;

/// A specialized `Result` type for native device calls.
pub type DeviceResult<T = ()> = std::result::Result<T, DeviceError>;
