//! Snapshot tests for error message formatting.
//!
//! Operator-facing messages are printed verbatim by the CLI, so their
//! wording is pinned here.

use ffbsim_errors::{CatalogError, DeviceError, FfbSimError, InitError, PlayError, ValidationError};
use insta::assert_snapshot;

mod device_error_snapshots {
    use super::*;

    #[test]
    fn test_not_found() {
        assert_snapshot!(DeviceError::not_found("045E:0034").to_string(), @"Device not found: 045E:0034");
    }

    #[test]
    fn test_ownership_lost() {
        assert_snapshot!(DeviceError::OwnershipLost.to_string(), @"Device ownership lost");
    }

    #[test]
    fn test_not_downloaded() {
        assert_snapshot!(
            DeviceError::NotDownloaded { handle: 4 }.to_string(),
            @"Effect 4 is not downloaded"
        );
    }

    #[test]
    fn test_rejected() {
        assert_snapshot!(
            DeviceError::rejected("Inertia", "effect type not supported").to_string(),
            @"Device rejected effect 'Inertia': effect type not supported"
        );
    }
}

mod session_error_snapshots {
    use super::*;

    #[test]
    fn test_init_empty_catalog() {
        assert_snapshot!(
            InitError::EmptyCatalog { rejected: 14 }.to_string(),
            @"No effect could be created on the device (14 rejected)"
        );
    }

    #[test]
    fn test_init_device_not_found() {
        assert_snapshot!(
            InitError::DeviceNotFound("VID 045E PID 0034".into()).to_string(),
            @"No force-feedback device found matching VID 045E PID 0034"
        );
    }

    #[test]
    fn test_play_failed() {
        assert_snapshot!(
            PlayError::failed("Spring", DeviceError::communication("wheel", "stall")).to_string(),
            @"Failed to play effect 'Spring': Communication error with device wheel: stall"
        );
    }

    #[test]
    fn test_play_lost() {
        assert_snapshot!(
            PlayError::Lost.to_string(),
            @"Device ownership lost; waiting for reacquisition"
        );
    }

    #[test]
    fn test_catalog_duplicate() {
        assert_snapshot!(
            CatalogError::DuplicateName("Sine".into()).to_string(),
            @"Effect 'Sine' is already in the catalog"
        );
    }
}

mod top_level_snapshots {
    use super::*;

    #[test]
    fn test_wrapped_validation() {
        let err: FfbSimError = ValidationError::out_of_range("poll_interval_ms", 0_u64, 1, 1000).into();
        assert_snapshot!(
            err.to_string(),
            @"Validation error: poll_interval_ms value 0 is out of range [1, 1000]"
        );
    }

    #[test]
    fn test_wrapped_init_device() {
        let err: FfbSimError = InitError::from(DeviceError::Closed).into();
        assert_snapshot!(err.to_string(), @"Initialization error: Device is closed");
    }
}
