//! Error types for the ffbsim CLI

use std::process::ExitCode;

use ffbsim_errors::{FfbSimError, InitError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device busy: {0}")]
    DeviceBusy(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No effect could be created on the device ({rejected} rejected)")]
    EmptyCatalog { rejected: usize },

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Terminal error: {0}")]
    Terminal(#[source] std::io::Error),

    #[error("Session error: {0}")]
    Session(#[source] FfbSimError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::DeviceNotFound(_) => 2,
            CliError::DeviceBusy(_) => 3,
            CliError::InvalidConfiguration(_) | CliError::JsonError(_) => 4,
            CliError::EmptyCatalog { .. } => 5,
            _ => 1,
        }
    }
}

impl From<InitError> for CliError {
    fn from(err: InitError) -> Self {
        match err {
            InitError::DeviceNotFound(what) => CliError::DeviceNotFound(what),
            InitError::DeviceBusy(what) => CliError::DeviceBusy(what),
            InitError::InvalidConfig(reason) => CliError::InvalidConfiguration(reason),
            InitError::EmptyCatalog { rejected } => CliError::EmptyCatalog { rejected },
            other => CliError::Session(FfbSimError::Init(other)),
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::InvalidConfiguration(err.to_string())
    }
}

impl From<FfbSimError> for CliError {
    fn from(err: FfbSimError) -> Self {
        match err {
            FfbSimError::Init(init) => init.into(),
            FfbSimError::Validation(validation) => validation.into(),
            FfbSimError::Config(reason) => CliError::InvalidConfiguration(reason),
            other => CliError::Session(other),
        }
    }
}

/// Exit code for an error escaping `main`.
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
    ExitCode::from(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffbsim_errors::DeviceError;

    #[test]
    fn init_errors_map_to_exit_codes() {
        let cases = [
            (InitError::DeviceNotFound("045E:0034".into()), 2),
            (InitError::DeviceBusy("/dev/input/event5".into()), 3),
            (InitError::InvalidConfig("poll_interval_ms".into()), 4),
            (InitError::EmptyCatalog { rejected: 14 }, 5),
            (InitError::Device(DeviceError::Closed), 1),
        ];
        for (err, code) in cases {
            assert_eq!(CliError::from(err).exit_code(), code);
        }
    }

    #[test]
    fn wrapped_init_error_keeps_its_code() {
        let err = FfbSimError::Init(InitError::DeviceBusy("wheel".into()));
        assert_eq!(CliError::from(err).exit_code(), 3);
    }

    #[test]
    fn config_file_errors_are_invalid_configuration() {
        let err = ValidationError::required("effects");
        assert_eq!(CliError::from(err).exit_code(), 4);

        let parse = FfbSimError::config("Failed to parse ffbsim.json: expected value");
        assert_eq!(CliError::from(parse).exit_code(), 4);
    }
}
