//! Device backend selection

use std::fmt;

use clap::ValueEnum;
#[cfg(all(target_os = "linux", feature = "evdev"))]
use ffbsim_session::EvdevProvider;
use ffbsim_session::{DeviceProvider, VirtualWheelControl, VirtualWheelProvider};

use crate::error::CliError;

/// Native model of the in-memory wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VirtualModel {
    /// Exclusive acquisition with re-download of evicted effects
    Polled,
    /// Effects uploaded once into a device-resident table
    Resident,
}

pub enum Backend {
    Virtual(VirtualWheelProvider),
    #[cfg(all(target_os = "linux", feature = "evdev"))]
    Evdev(EvdevProvider),
}

impl Backend {
    /// The virtual wheel when requested, otherwise the platform backend.
    pub fn select(virtual_model: Option<VirtualModel>) -> Result<Self, CliError> {
        match virtual_model {
            Some(VirtualModel::Polled) => Ok(Backend::Virtual(
                VirtualWheelControl::sidewinder().provider(),
            )),
            Some(VirtualModel::Resident) => {
                Ok(Backend::Virtual(VirtualWheelControl::resident().provider()))
            }
            None => Self::native(),
        }
    }

    #[cfg(all(target_os = "linux", feature = "evdev"))]
    fn native() -> Result<Self, CliError> {
        Ok(Backend::Evdev(EvdevProvider::new()))
    }

    #[cfg(not(all(target_os = "linux", feature = "evdev")))]
    fn native() -> Result<Self, CliError> {
        Err(CliError::BackendUnavailable(
            "this build has no native force-feedback backend; use --virtual polled|resident"
                .to_string(),
        ))
    }

    pub fn provider(&self) -> &dyn DeviceProvider {
        match self {
            Backend::Virtual(provider) => provider,
            #[cfg(all(target_os = "linux", feature = "evdev"))]
            Backend::Evdev(provider) => provider,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Virtual(provider) => {
                write!(f, "virtual ({})", provider.control().info().model)
            }
            #[cfg(all(target_os = "linux", feature = "evdev"))]
            Backend::Evdev(_) => write!(f, "evdev"),
        }
    }
}
