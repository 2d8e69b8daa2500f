//! Force-feedback device session for a single steering axis.
//!
//! This crate owns everything between the operator's key presses and the
//! native driver:
//!
//! - [`EffectCatalog`]: ordered effects, a wrapping cursor and a single
//!   playing slot
//! - [`DeviceSession`]: open/acquire, registration, play/stop/update and
//!   an idempotent close
//! - [`PollingLoop`]: background reacquisition and input sampling
//! - [`ForceFeedbackDevice`]: the capability interface implemented by
//!   [`VirtualWheel`] and, on Linux, the evdev backend
//!
//! # Example
//!
//! ```
//! use ffbsim_session::{DeviceLocator, DeviceSession, SessionConfig, VirtualWheelControl};
//!
//! let wheel = VirtualWheelControl::sidewinder();
//! let (session, report) = DeviceSession::initialize(
//!     &wheel.provider(),
//!     &DeviceLocator::default(),
//!     SessionConfig::default(),
//! )?;
//! assert_eq!(report.registered, 14);
//!
//! session.play_selected()?;
//! assert!(session.snapshot().playing);
//! session.stop_all();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod catalog;
pub mod config;
pub mod device;
#[cfg(all(target_os = "linux", feature = "evdev"))]
pub mod evdev_backend;
pub mod link;
pub mod poller;
pub mod session;
pub mod state;
pub mod tuning;
pub mod virtual_wheel;

pub use catalog::{CatalogEntry, EffectCatalog};
pub use config::SessionConfig;
pub use device::{
    DeviceInfo, DeviceLocator, DeviceModel, DeviceProvider, DeviceSample, EffectHandle,
    ForceFeedbackDevice,
};
#[cfg(all(target_os = "linux", feature = "evdev"))]
pub use evdev_backend::{EvdevProvider, EvdevWheel};
pub use link::{DeviceLink, TickOutcome};
pub use poller::PollingLoop;
pub use session::{DeviceSession, InitReport, RegistrationWarning, SessionSnapshot};
pub use state::{AcquisitionCell, AcquisitionState};
pub use tuning::{Tuning, format_buttons, format_direction};
pub use virtual_wheel::{VirtualWheel, VirtualWheelControl, VirtualWheelProvider};
