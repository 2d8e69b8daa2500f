//! Session lifecycle, catalog and playback errors.

use crate::common::{ErrorClass, ErrorSeverity};
use crate::device::DeviceError;

/// Effect catalog errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// An effect with this name is already registered
    #[error("Effect '{0}' is already in the catalog")]
    DuplicateName(String),

    /// The catalog holds no effects
    #[error("Effect catalog is empty")]
    EmptyCatalog,
}

impl CatalogError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CatalogError::DuplicateName(_) => ErrorSeverity::Warning,
            CatalogError::EmptyCatalog => ErrorSeverity::Error,
        }
    }

    /// Get the propagation class.
    pub fn class(&self) -> ErrorClass {
        match self {
            CatalogError::DuplicateName(_) => ErrorClass::Degraded,
            CatalogError::EmptyCatalog => ErrorClass::Fatal,
        }
    }
}

/// Errors that abort session initialization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitError {
    /// No device matched the locator
    #[error("No force-feedback device found matching {0}")]
    DeviceNotFound(String),

    /// The device is held exclusively by another process
    #[error("Device {0} is held by another process")]
    DeviceBusy(String),

    /// Every effect in the catalog was rejected
    #[error("No effect could be created on the device ({rejected} rejected)")]
    EmptyCatalog {
        /// Number of rejected effect definitions
        rejected: usize,
    },

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Any other device failure during open or acquire
    #[error(transparent)]
    Device(#[from] DeviceError),
}

impl InitError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Critical
    }

    /// Get the propagation class.
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Fatal
    }

    /// Lift a device failure from open or acquire into an init error.
    ///
    /// `NotFound` and `Busy` get their own variants so callers can report
    /// them without inspecting the device error.
    pub fn from_device(err: DeviceError) -> Self {
        match err {
            DeviceError::NotFound(what) => InitError::DeviceNotFound(what),
            DeviceError::Busy(what) => InitError::DeviceBusy(what),
            other => InitError::Device(other),
        }
    }
}

/// Errors surfaced by a play request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayError {
    /// The device refused to start the effect
    #[error("Failed to play effect '{effect}': {source}")]
    PlayFailed {
        /// Effect name
        effect: String,
        /// Underlying device failure
        #[source]
        source: DeviceError,
    },

    /// The device refused new parameters for a playing effect
    #[error("Failed to update effect '{effect}': {source}")]
    UpdateFailed {
        /// Effect name
        effect: String,
        /// Underlying device failure
        #[source]
        source: DeviceError,
    },

    /// Device ownership was lost; the polling loop will reacquire
    #[error("Device ownership lost; waiting for reacquisition")]
    Lost,

    /// The catalog holds no effects
    #[error("No effect selected: catalog is empty")]
    EmptyCatalog,

    /// No catalog entry holds this handle
    #[error("No effect registered under handle {0}")]
    UnknownEffect(u32),

    /// The session was already closed
    #[error("Session is closed")]
    Closed,
}

impl PlayError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PlayError::PlayFailed { .. } | PlayError::UpdateFailed { .. } => ErrorSeverity::Error,
            PlayError::Lost => ErrorSeverity::Warning,
            PlayError::EmptyCatalog | PlayError::UnknownEffect(_) | PlayError::Closed => {
                ErrorSeverity::Error
            }
        }
    }

    /// Get the propagation class.
    pub fn class(&self) -> ErrorClass {
        match self {
            PlayError::PlayFailed { .. } | PlayError::UpdateFailed { .. } | PlayError::Lost => {
                ErrorClass::Transient
            }
            PlayError::EmptyCatalog | PlayError::UnknownEffect(_) | PlayError::Closed => {
                ErrorClass::Fatal
            }
        }
    }

    /// Create a play failure for `effect`.
    pub fn failed(effect: impl Into<String>, source: DeviceError) -> Self {
        PlayError::PlayFailed {
            effect: effect.into(),
            source,
        }
    }
}

impl From<CatalogError> for PlayError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::EmptyCatalog | CatalogError::DuplicateName(_) => PlayError::EmptyCatalog,
        }
    }
}
