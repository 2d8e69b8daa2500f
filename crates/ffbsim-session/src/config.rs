//! Session configuration with validation
//!
//! Loaded from JSON. A missing file means defaults; every field is
//! optional in the file.

use std::path::Path;
use std::time::Duration;

use ffbsim_errors::{FfbSimError, ValidationError, validate, validate_range};
use ffbsim_ffb::{
    DEFAULT_EFFECT_DURATION_MS, EffectDefinition, EffectDuration, ForceScale, MAX_EFFECT_DURATION_MS,
    MIN_EFFECT_DURATION_MS, RESIDENT_PLATFORM_MAX, default_effects,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::device::DeviceModel;

/// Tunable session parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Native magnitude range; the device model decides when unset
    pub platform_max: Option<i32>,
    /// Polling loop period in milliseconds
    pub poll_interval_ms: u64,
    /// Normalized intensity at startup
    pub initial_intensity: f32,
    /// Normalized change per intensity key press
    pub intensity_step: f32,
    /// Duration shown at startup
    pub initial_duration: EffectDuration,
    /// Change per duration key press
    pub duration_step_ms: u32,
    pub min_duration_ms: u32,
    pub max_duration_ms: u32,
    /// Normalized change per direction key press
    pub direction_step: f32,
    /// Turn off the device's own centering spring while the session runs;
    /// it is restored on close
    pub disable_autocenter: bool,
    /// Replaces the built-in effect list when set
    pub effects: Option<Vec<EffectDefinition>>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            platform_max: None,
            poll_interval_ms: 16,
            initial_intensity: 0.5,
            intensity_step: 0.05,
            initial_duration: EffectDuration::Millis(DEFAULT_EFFECT_DURATION_MS),
            duration_step_ms: 500,
            min_duration_ms: MIN_EFFECT_DURATION_MS,
            max_duration_ms: MAX_EFFECT_DURATION_MS,
            direction_step: 0.1,
            disable_autocenter: true,
            effects: None,
        }
    }
}

impl SessionConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an I/O or configuration error when the file exists but cannot
    /// be read or parsed. The result is not validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FfbSimError> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: SessionConfig = serde_json::from_str(&content).map_err(|e| {
            FfbSimError::config(format!("Failed to parse {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "Loaded session config");
        Ok(config)
    }

    /// Writes the configuration as pretty JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FfbSimError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), "Saved session config");
        Ok(())
    }

    /// Pretty JSON rendering.
    ///
    /// # Errors
    ///
    /// Fails only if a float field is not finite.
    pub fn to_json(&self) -> Result<String, FfbSimError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FfbSimError::config(format!("Failed to serialize config: {e}")))
    }

    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(max) = self.platform_max {
            validate_range!("platform_max", max, 1, i32::MAX);
        }
        validate_range!("poll_interval_ms", self.poll_interval_ms, 1, 1_000);
        validate_range!("initial_intensity", self.initial_intensity, -1.0_f32, 1.0_f32);
        validate!(
            self.intensity_step > 0.0 && self.intensity_step <= 1.0,
            ValidationError::out_of_range("intensity_step", self.intensity_step, 0.0, 1.0)
        );
        validate!(
            self.direction_step > 0.0 && self.direction_step <= 1.0,
            ValidationError::out_of_range("direction_step", self.direction_step, 0.0, 1.0)
        );
        validate!(
            self.duration_step_ms > 0,
            ValidationError::out_of_range("duration_step_ms", self.duration_step_ms, 1, u32::MAX)
        );
        validate!(
            self.min_duration_ms > 0 && self.min_duration_ms <= self.max_duration_ms,
            ValidationError::DurationBounds {
                min_ms: self.min_duration_ms,
                max_ms: self.max_duration_ms,
            }
        );
        if let EffectDuration::Millis(ms) = self.initial_duration {
            validate_range!("initial_duration", ms, self.min_duration_ms, self.max_duration_ms);
        }
        if let Some(effects) = &self.effects {
            validate!(!effects.is_empty(), ValidationError::required("effects"));
            let mut seen = std::collections::HashSet::new();
            for effect in effects {
                effect.validate()?;
                validate!(
                    seen.insert(effect.name.as_str()),
                    ValidationError::duplicate("effects.name", effect.name.clone())
                );
            }
        }
        Ok(())
    }

    /// Checks limits that depend on the opened device's native model.
    /// Resident-table levels are 16-bit signed.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` for a `platform_max` the model cannot carry.
    pub fn validate_for(&self, model: DeviceModel) -> Result<(), ValidationError> {
        if let (DeviceModel::ResidentTable, Some(max)) = (model, self.platform_max) {
            validate_range!("platform_max", max, 1, RESIDENT_PLATFORM_MAX);
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Scale for a device of `model`, honoring an explicit `platform_max`.
    pub fn force_scale(&self, model: DeviceModel) -> ForceScale {
        ForceScale::new(
            self.platform_max
                .unwrap_or_else(|| model.default_platform_max()),
        )
    }

    /// Effect definitions to register: the override list or the built-in set.
    pub fn effect_definitions(&self) -> Vec<EffectDefinition> {
        self.effects.clone().unwrap_or_else(default_effects)
    }
}

#[cfg(test)]
mod tests {
    use ffbsim_ffb::{EffectKind, Waveform};
    use ffbsim_test_helpers::prelude::*;

    use super::*;

    #[test]
    fn test_defaults_are_valid() -> TestResult {
        let config = SessionConfig::default();
        config.validate()?;
        assert_eq!(config.poll_interval(), Duration::from_millis(16));
        assert_eq!(config.effect_definitions().len(), 14);
        Ok(())
    }

    #[test]
    fn test_force_scale_follows_model() {
        let config = SessionConfig::default();
        assert_eq!(config.force_scale(DeviceModel::PolledAcquisition).platform_max(), 10_000);
        assert_eq!(config.force_scale(DeviceModel::ResidentTable).platform_max(), 32_767);

        let fixed = SessionConfig {
            platform_max: Some(255),
            ..SessionConfig::default()
        };
        assert_eq!(fixed.force_scale(DeviceModel::ResidentTable).platform_max(), 255);
    }

    #[test]
    fn test_platform_max_limited_on_resident_devices() -> TestResult {
        let wide = SessionConfig {
            platform_max: Some(65_535),
            ..SessionConfig::default()
        };
        wide.validate()?;
        wide.validate_for(DeviceModel::PolledAcquisition)?;
        assert!(matches!(
            wide.validate_for(DeviceModel::ResidentTable),
            Err(ValidationError::OutOfRange { .. })
        ));

        let exact = SessionConfig {
            platform_max: Some(RESIDENT_PLATFORM_MAX),
            ..SessionConfig::default()
        };
        exact.validate_for(DeviceModel::ResidentTable)?;
        SessionConfig::default().validate_for(DeviceModel::ResidentTable)?;
        Ok(())
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let cases = [
            SessionConfig {
                platform_max: Some(0),
                ..SessionConfig::default()
            },
            SessionConfig {
                poll_interval_ms: 0,
                ..SessionConfig::default()
            },
            SessionConfig {
                poll_interval_ms: 5_000,
                ..SessionConfig::default()
            },
            SessionConfig {
                intensity_step: 0.0,
                ..SessionConfig::default()
            },
            SessionConfig {
                direction_step: 1.5,
                ..SessionConfig::default()
            },
            SessionConfig {
                initial_intensity: -1.2,
                ..SessionConfig::default()
            },
            SessionConfig {
                min_duration_ms: 5_000,
                max_duration_ms: 1_000,
                ..SessionConfig::default()
            },
            SessionConfig {
                effects: Some(Vec::new()),
                ..SessionConfig::default()
            },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_effect_names() {
        let sine = EffectDefinition::new("Buzz", EffectKind::periodic(Waveform::Sine, 0.5, 50));
        let config = SessionConfig {
            effects: Some(vec![sine.clone(), sine]),
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::duplicate("effects.name", "Buzz"))
        );
    }

    #[test]
    fn test_missing_file_gives_defaults() -> TestResult {
        let dir = tempfile::tempdir()?;
        let config = SessionConfig::load(dir.path().join("absent.json"))?;
        assert_eq!(config, SessionConfig::default());
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("ffbsim.json");
        let config = SessionConfig {
            poll_interval_ms: 8,
            initial_duration: EffectDuration::Infinite,
            ..SessionConfig::default()
        };
        config.save(&path)?;
        assert_eq!(SessionConfig::load(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "poll_interval_ms": 20, "platform_max": 4096 }"#)?;
        let config = SessionConfig::load(&path)?;
        assert_eq!(config.poll_interval_ms, 20);
        assert_eq!(config.platform_max, Some(4096));
        assert_eq!(config.intensity_step, SessionConfig::default().intensity_step);
        Ok(())
    }

    #[test]
    fn test_malformed_file_is_config_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json")?;
        assert!(matches!(SessionConfig::load(&path), Err(FfbSimError::Config(_))));
        Ok(())
    }
}
