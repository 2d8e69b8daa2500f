//! Top-level error and the two classification axes shared by every crate.

use core::fmt;

use crate::{CatalogError, DeviceError, InitError, PlayError, ValidationError};

/// Any failure surfaced by the simulator crates.
#[derive(Debug, thiserror::Error)]
pub enum FfbSimError {
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Initialization error: {0}")]
    Init(#[from] InitError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Playback error: {0}")]
    Play(#[from] PlayError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Reading or writing the configuration file
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Unparsable configuration file
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FfbSimError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FfbSimError::Device(e) => e.severity(),
            FfbSimError::Init(e) => e.severity(),
            FfbSimError::Catalog(e) => e.severity(),
            FfbSimError::Play(e) => e.severity(),
            FfbSimError::Validation(e) => e.severity(),
            FfbSimError::Io(_) | FfbSimError::Config(_) => ErrorSeverity::Error,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            FfbSimError::Device(e) => e.class(),
            FfbSimError::Init(e) => e.class(),
            FfbSimError::Catalog(e) => e.class(),
            FfbSimError::Play(e) => e.class(),
            FfbSimError::Validation(_) | FfbSimError::Io(_) | FfbSimError::Config(_) => {
                ErrorClass::Fatal
            }
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        FfbSimError::Config(msg.into())
    }
}

impl From<std::io::Error> for FfbSimError {
    fn from(e: std::io::Error) -> Self {
        FfbSimError::Io(e)
    }
}

/// Logging weight of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    Info = 0,
    Warning = 1,
    /// The triggering call failed
    Error = 2,
    /// The session cannot start or continue
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// How an error propagates through the session.
///
/// ```
/// use ffbsim_errors::{DeviceError, ErrorClass};
///
/// assert_eq!(DeviceError::OwnershipLost.class(), ErrorClass::Transient);
/// assert_eq!(DeviceError::not_found("wheel").class(), ErrorClass::Fatal);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Device absent or unopenable; aborts the whole session.
    Fatal,
    /// Part of the catalog is unavailable; the session proceeds.
    Degraded,
    /// Recovered by retry, otherwise surfaced on the triggering call only.
    Transient,
    /// Always swallowed after logging.
    Ignored,
}

impl ErrorClass {
    /// Whether the session keeps running after an error of this class.
    pub fn session_survives(self) -> bool {
        !matches!(self, ErrorClass::Fatal)
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::Fatal => write!(f, "fatal"),
            ErrorClass::Degraded => write!(f, "degraded"),
            ErrorClass::Transient => write!(f, "transient"),
            ErrorClass::Ignored => write!(f, "ignored"),
        }
    }
}
