//! Test support shared by the simulator crates: panicking unwraps that
//! keep the caller's location, approximate float assertions, and bounded
//! polling for state the session's background thread changes.
//!
//! ```rust,ignore
//! use ffbsim_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::unwrap_used, clippy::panic, reason = "test-only crate")]

pub mod assertions;
pub mod must;
pub mod prelude;
pub mod wait;

pub use must::{must, must_some};
pub use wait::wait_until;
