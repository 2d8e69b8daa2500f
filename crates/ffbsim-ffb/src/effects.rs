//! FFB effect definitions in the normalized domain

use ffbsim_errors::{ValidationError, validate, validate_range};
use serde::{Deserialize, Serialize};

/// Flat list of native effect types a device may or may not support
///
/// # Examples
///
/// ```
/// use ffbsim_ffb::{EffectKind, EffectType, Waveform};
///
/// let kind = EffectKind::periodic(Waveform::Triangle, 0.5, 300);
/// assert_eq!(kind.effect_type(), EffectType::Triangle);
/// assert!(EffectType::Triangle.is_periodic());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    Constant,
    Ramp,
    Square,
    Sine,
    Triangle,
    SawtoothUp,
    SawtoothDown,
    Spring,
    Damper,
    Inertia,
    Friction,
}

impl EffectType {
    /// Every effect type, in native declaration order.
    pub const ALL: [EffectType; 11] = [
        EffectType::Constant,
        EffectType::Ramp,
        EffectType::Square,
        EffectType::Sine,
        EffectType::Triangle,
        EffectType::SawtoothUp,
        EffectType::SawtoothDown,
        EffectType::Spring,
        EffectType::Damper,
        EffectType::Inertia,
        EffectType::Friction,
    ];

    pub fn is_periodic(self) -> bool {
        matches!(
            self,
            EffectType::Square
                | EffectType::Sine
                | EffectType::Triangle
                | EffectType::SawtoothUp
                | EffectType::SawtoothDown
        )
    }

    pub fn is_condition(self) -> bool {
        matches!(
            self,
            EffectType::Spring | EffectType::Damper | EffectType::Inertia | EffectType::Friction
        )
    }

    /// Human-readable label used in logs and device listings.
    pub fn label(self) -> &'static str {
        match self {
            EffectType::Constant => "constant",
            EffectType::Ramp => "ramp",
            EffectType::Square => "square",
            EffectType::Sine => "sine",
            EffectType::Triangle => "triangle",
            EffectType::SawtoothUp => "sawtooth-up",
            EffectType::SawtoothDown => "sawtooth-down",
            EffectType::Spring => "spring",
            EffectType::Damper => "damper",
            EffectType::Inertia => "inertia",
            EffectType::Friction => "friction",
        }
    }
}

impl std::fmt::Display for EffectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Periodic waveform shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    SawtoothUp,
    SawtoothDown,
}

impl Waveform {
    pub fn effect_type(self) -> EffectType {
        match self {
            Waveform::Sine => EffectType::Sine,
            Waveform::Square => EffectType::Square,
            Waveform::Triangle => EffectType::Triangle,
            Waveform::SawtoothUp => EffectType::SawtoothUp,
            Waveform::SawtoothDown => EffectType::SawtoothDown,
        }
    }
}

/// Condition force law
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    /// Force proportional to displacement
    Spring,
    /// Force proportional to velocity
    Damper,
    /// Force proportional to acceleration
    Inertia,
    /// Constant force opposing motion
    Friction,
}

impl ConditionType {
    pub fn effect_type(self) -> EffectType {
        match self {
            ConditionType::Spring => EffectType::Spring,
            ConditionType::Damper => EffectType::Damper,
            ConditionType::Inertia => EffectType::Inertia,
            ConditionType::Friction => EffectType::Friction,
        }
    }
}

/// How long an effect plays once started
///
/// # Examples
///
/// ```
/// use ffbsim_ffb::EffectDuration;
///
/// assert_eq!(EffectDuration::Millis(2000).to_string(), "2000 ms");
/// assert_eq!(EffectDuration::Infinite.to_string(), "Infinite");
/// assert_eq!(EffectDuration::Infinite.as_millis(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectDuration {
    #[default]
    Infinite,
    Millis(u32),
}

impl EffectDuration {
    pub fn as_millis(self) -> Option<u32> {
        match self {
            EffectDuration::Infinite => None,
            EffectDuration::Millis(ms) => Some(ms),
        }
    }

    pub fn is_infinite(self) -> bool {
        self == EffectDuration::Infinite
    }
}

impl std::fmt::Display for EffectDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EffectDuration::Infinite => write!(f, "Infinite"),
            EffectDuration::Millis(ms) => write!(f, "{ms} ms"),
        }
    }
}

/// Kind-specific effect parameters in the normalized domain
///
/// Signed levels live in `[-1.0, 1.0]`; coefficients, saturation and
/// deadband in `[0.0, 1.0]`; phase is a fraction of one cycle in `[0.0, 1.0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectKind {
    Constant {
        level: f32,
    },
    Periodic {
        waveform: Waveform,
        magnitude: f32,
        period_ms: u32,
        #[serde(default)]
        phase: f32,
    },
    Ramp {
        start: f32,
        end: f32,
    },
    Condition {
        condition: ConditionType,
        coefficient: f32,
        saturation: f32,
        deadband: f32,
    },
}

impl EffectKind {
    pub fn constant(level: f32) -> Self {
        EffectKind::Constant { level }
    }

    pub fn periodic(waveform: Waveform, magnitude: f32, period_ms: u32) -> Self {
        EffectKind::Periodic {
            waveform,
            magnitude,
            period_ms,
            phase: 0.0,
        }
    }

    pub fn ramp(start: f32, end: f32) -> Self {
        EffectKind::Ramp { start, end }
    }

    pub fn condition(condition: ConditionType, coefficient: f32, saturation: f32, deadband: f32) -> Self {
        EffectKind::Condition {
            condition,
            coefficient,
            saturation,
            deadband,
        }
    }

    pub fn effect_type(&self) -> EffectType {
        match self {
            EffectKind::Constant { .. } => EffectType::Constant,
            EffectKind::Periodic { waveform, .. } => waveform.effect_type(),
            EffectKind::Ramp { .. } => EffectType::Ramp,
            EffectKind::Condition { condition, .. } => condition.effect_type(),
        }
    }

    /// Whether a playing effect of this kind accepts live intensity updates.
    pub fn supports_intensity_update(&self) -> bool {
        matches!(self, EffectKind::Constant { .. } | EffectKind::Periodic { .. })
    }

    fn validate(&self, name: &str) -> Result<(), ValidationError> {
        match *self {
            EffectKind::Constant { level } => {
                validate_range!(format!("{name}.level"), level, -1.0_f32, 1.0_f32);
            }
            EffectKind::Periodic {
                magnitude,
                period_ms,
                phase,
                ..
            } => {
                validate_range!(format!("{name}.magnitude"), magnitude, -1.0_f32, 1.0_f32);
                validate!(
                    period_ms > 0,
                    ValidationError::out_of_range(format!("{name}.period_ms"), period_ms, 1, u32::MAX)
                );
                validate!(
                    (0.0_f32..1.0).contains(&phase),
                    ValidationError::out_of_range(format!("{name}.phase"), phase, 0.0, 1.0)
                );
            }
            EffectKind::Ramp { start, end } => {
                validate_range!(format!("{name}.start"), start, -1.0_f32, 1.0_f32);
                validate_range!(format!("{name}.end"), end, -1.0_f32, 1.0_f32);
            }
            EffectKind::Condition {
                coefficient,
                saturation,
                deadband,
                ..
            } => {
                validate_range!(format!("{name}.coefficient"), coefficient, 0.0_f32, 1.0_f32);
                validate_range!(format!("{name}.saturation"), saturation, 0.0_f32, 1.0_f32);
                validate_range!(format!("{name}.deadband"), deadband, 0.0_f32, 1.0_f32);
            }
        }
        Ok(())
    }
}

/// Immutable logical description of one effect
///
/// # Examples
///
/// ```
/// use ffbsim_ffb::{ConditionType, EffectDefinition, EffectDuration, EffectKind};
///
/// let spring = EffectDefinition::new(
///     "Spring",
///     EffectKind::condition(ConditionType::Spring, 0.8, 1.0, 0.05),
/// );
/// assert_eq!(spring.duration, EffectDuration::Infinite);
/// assert!(spring.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDefinition {
    pub name: String,
    #[serde(flatten)]
    pub kind: EffectKind,
    #[serde(default)]
    pub duration: EffectDuration,
}

impl EffectDefinition {
    /// Creates an infinite-duration definition.
    pub fn new(name: impl Into<String>, kind: EffectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            duration: EffectDuration::Infinite,
        }
    }

    pub fn with_duration(mut self, duration: EffectDuration) -> Self {
        self.duration = duration;
        self
    }

    pub fn effect_type(&self) -> EffectType {
        self.kind.effect_type()
    }

    /// Checks every normalized parameter against its domain.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate!(
            !self.name.trim().is_empty(),
            ValidationError::required("effect.name")
        );
        validate!(
            self.duration != EffectDuration::Millis(0),
            ValidationError::out_of_range(format!("{}.duration", self.name), 0, 1, u32::MAX)
        );
        self.kind.validate(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_type_mapping() {
        assert_eq!(EffectKind::constant(0.8).effect_type(), EffectType::Constant);
        assert_eq!(EffectKind::ramp(0.2, 1.0).effect_type(), EffectType::Ramp);
        assert_eq!(
            EffectKind::periodic(Waveform::SawtoothUp, 0.6, 180).effect_type(),
            EffectType::SawtoothUp
        );
        assert_eq!(
            EffectKind::condition(ConditionType::Inertia, 0.6, 1.0, 0.0).effect_type(),
            EffectType::Inertia
        );
    }

    #[test]
    fn test_effect_type_partitions() {
        for ty in EffectType::ALL {
            let families = [
                ty == EffectType::Constant,
                ty == EffectType::Ramp,
                ty.is_periodic(),
                ty.is_condition(),
            ];
            assert_eq!(families.iter().filter(|f| **f).count(), 1, "{ty}");
        }
    }

    #[test]
    fn test_intensity_update_support() {
        assert!(EffectKind::constant(0.5).supports_intensity_update());
        assert!(EffectKind::periodic(Waveform::Sine, 0.5, 200).supports_intensity_update());
        assert!(!EffectKind::ramp(0.0, 1.0).supports_intensity_update());
        assert!(!EffectKind::condition(ConditionType::Spring, 0.5, 1.0, 0.0).supports_intensity_update());
    }

    #[test]
    fn test_validate_rejects_out_of_domain() {
        let bad_level = EffectDefinition::new("Too strong", EffectKind::constant(1.5));
        assert!(matches!(bad_level.validate(), Err(ValidationError::OutOfRange { .. })));

        let bad_phase = EffectDefinition::new(
            "Phase",
            EffectKind::Periodic {
                waveform: Waveform::Sine,
                magnitude: 0.5,
                period_ms: 200,
                phase: 1.0,
            },
        );
        assert!(bad_phase.validate().is_err());

        let zero_period = EffectDefinition::new("Zero", EffectKind::periodic(Waveform::Square, 0.5, 0));
        assert!(zero_period.validate().is_err());

        let negative_deadband = EffectDefinition::new(
            "Deadband",
            EffectKind::condition(ConditionType::Spring, 0.5, 1.0, -0.1),
        );
        assert!(negative_deadband.validate().is_err());

        let nan = EffectDefinition::new("NaN", EffectKind::ramp(f32::NAN, 0.0));
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_name_and_zero_duration() {
        let unnamed = EffectDefinition::new("  ", EffectKind::constant(0.5));
        assert_eq!(unnamed.validate(), Err(ValidationError::required("effect.name")));

        let zero = EffectDefinition::new("Zero", EffectKind::constant(0.5))
            .with_duration(EffectDuration::Millis(0));
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_zero_coefficient_condition_is_legal() {
        let inert = EffectDefinition::new(
            "Inert",
            EffectKind::condition(ConditionType::Damper, 0.0, 0.0, 0.0),
        );
        assert!(inert.validate().is_ok());
    }
}
