//! Native force-feedback device errors.
//!
//! These are the failures a backend reports from open, acquire, effect
//! registration and playback calls. The session layer maps them onto
//! [`InitError`](crate::InitError) and [`PlayError`](crate::PlayError).

use crate::common::{ErrorClass, ErrorSeverity};

/// Errors reported by a native force-feedback backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// No device matched the locator
    #[error("Device not found: {0}")]
    NotFound(String),

    /// Another process holds the device exclusively
    #[error("Device {0} is busy")]
    Busy(String),

    /// Permission denied
    #[error("Permission denied for device: {0}")]
    PermissionDenied(String),

    /// Exclusive ownership was taken away from this process
    #[error("Device ownership lost")]
    OwnershipLost,

    /// The call requires an acquired device
    #[error("Device is not acquired")]
    NotAcquired,

    /// Effect parameters are not resident on the device yet
    #[error("Effect {handle} is not downloaded")]
    NotDownloaded {
        /// Backend effect handle
        handle: u32,
    },

    /// The device refused to create an effect
    #[error("Device rejected effect '{effect}': {reason}")]
    Rejected {
        /// Effect name
        effect: String,
        /// Rejection reason
        reason: String,
    },

    /// Feature not supported
    #[error("Feature '{feature}' not supported by device {device}")]
    Unsupported {
        /// Device identifier
        device: String,
        /// Feature name
        feature: String,
    },

    /// Communication error
    #[error("Communication error with device {device}: {message}")]
    Communication {
        /// Device identifier
        device: String,
        /// Error message
        message: String,
    },

    /// The device handle was already closed
    #[error("Device is closed")]
    Closed,

    /// Operating system I/O failure
    #[error("I/O error during {operation}: {message}")]
    Io {
        /// Operation being performed
        operation: String,
        /// Error message
        message: String,
    },
}

impl DeviceError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DeviceError::NotFound(_) => ErrorSeverity::Critical,
            DeviceError::Busy(_) => ErrorSeverity::Critical,
            DeviceError::PermissionDenied(_) => ErrorSeverity::Critical,
            DeviceError::OwnershipLost => ErrorSeverity::Warning,
            DeviceError::NotAcquired => ErrorSeverity::Warning,
            DeviceError::NotDownloaded { .. } => ErrorSeverity::Info,
            DeviceError::Rejected { .. } => ErrorSeverity::Warning,
            DeviceError::Unsupported { .. } => ErrorSeverity::Warning,
            DeviceError::Communication { .. } => ErrorSeverity::Error,
            DeviceError::Closed => ErrorSeverity::Error,
            DeviceError::Io { .. } => ErrorSeverity::Error,
        }
    }

    /// Get the propagation class.
    pub fn class(&self) -> ErrorClass {
        match self {
            DeviceError::NotFound(_)
            | DeviceError::Busy(_)
            | DeviceError::PermissionDenied(_)
            | DeviceError::Closed
            | DeviceError::Io { .. } => ErrorClass::Fatal,
            DeviceError::Rejected { .. } | DeviceError::Unsupported { .. } => ErrorClass::Degraded,
            DeviceError::OwnershipLost
            | DeviceError::NotAcquired
            | DeviceError::NotDownloaded { .. }
            | DeviceError::Communication { .. } => ErrorClass::Transient,
        }
    }

    /// Check if this error means the process no longer owns the device.
    pub fn is_ownership_loss(&self) -> bool {
        matches!(self, DeviceError::OwnershipLost | DeviceError::NotAcquired)
    }

    /// Check if this error indicates the device is unavailable.
    pub fn is_device_unavailable(&self) -> bool {
        matches!(
            self,
            DeviceError::NotFound(_)
                | DeviceError::Busy(_)
                | DeviceError::PermissionDenied(_)
                | DeviceError::Closed
        )
    }

    /// Check if retrying the operation might succeed.
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    /// Create a not found error.
    pub fn not_found(device: impl Into<String>) -> Self {
        DeviceError::NotFound(device.into())
    }

    /// Create a busy error.
    pub fn busy(device: impl Into<String>) -> Self {
        DeviceError::Busy(device.into())
    }

    /// Create a rejected effect error.
    pub fn rejected(effect: impl Into<String>, reason: impl Into<String>) -> Self {
        DeviceError::Rejected {
            effect: effect.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported feature error.
    pub fn unsupported(device: impl Into<String>, feature: impl Into<String>) -> Self {
        DeviceError::Unsupported {
            device: device.into(),
            feature: feature.into(),
        }
    }

    /// Create a communication error.
    pub fn communication(device: impl Into<String>, message: impl Into<String>) -> Self {
        DeviceError::Communication {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Wrap an I/O error raised during `operation`.
    ///
    /// `NotFound` and `PermissionDenied` kinds keep their meaning; a
    /// `ResourceBusy` kind becomes [`DeviceError::Busy`].
    pub fn from_io(operation: impl Into<String>, err: &std::io::Error) -> Self {
        let operation = operation.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => DeviceError::NotFound(operation),
            std::io::ErrorKind::PermissionDenied => DeviceError::PermissionDenied(operation),
            std::io::ErrorKind::ResourceBusy => DeviceError::Busy(operation),
            _ => DeviceError::Io {
                operation,
                message: err.to_string(),
            },
        }
    }
}
