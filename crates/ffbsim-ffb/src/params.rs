//! Native parameter blocks built from normalized definitions
//!
//! A [`NativeEffect`] is what a backend receives when registering an
//! effect: every level already scaled into the session's platform range.

use serde::{Deserialize, Serialize};

use crate::constants::{FULL_TURN_CENTIDEGREES, STEERING_AXIS_DIRECTION};
use crate::effects::{ConditionType, EffectDefinition, EffectDuration, EffectKind, EffectType, Waveform};
use crate::scale::ForceScale;

/// Attack/fade shaping. Both native models support it; effects built here
/// always leave it at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Envelope {
    pub attack_level: u32,
    pub attack_length_ms: u32,
    pub fade_level: u32,
    pub fade_length_ms: u32,
}

/// Type-specific parameter block in native units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeParams {
    Constant {
        magnitude: i32,
    },
    Periodic {
        waveform: Waveform,
        /// Unsigned; the sign of the normalized level is dropped.
        magnitude: u32,
        offset: i32,
        /// Hundredths of a degree in `[0, 36000)`.
        phase: u32,
        period_us: u32,
    },
    Ramp {
        start: i32,
        end: i32,
    },
    Condition {
        condition: ConditionType,
        positive_coefficient: i32,
        negative_coefficient: i32,
        positive_saturation: u32,
        negative_saturation: u32,
        deadband: u32,
        offset: i32,
    },
}

impl TypeParams {
    pub fn effect_type(&self) -> EffectType {
        match self {
            TypeParams::Constant { .. } => EffectType::Constant,
            TypeParams::Periodic { waveform, .. } => waveform.effect_type(),
            TypeParams::Ramp { .. } => EffectType::Ramp,
            TypeParams::Condition { condition, .. } => condition.effect_type(),
        }
    }
}

/// Complete native description of one effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeEffect {
    /// Hundredths of a degree; the steering axis points at 9000.
    pub direction: u32,
    pub duration: EffectDuration,
    pub envelope: Envelope,
    pub params: TypeParams,
}

impl NativeEffect {
    pub fn effect_type(&self) -> EffectType {
        self.params.effect_type()
    }
}

impl ForceScale {
    /// Builds the full native effect for a definition.
    ///
    /// # Examples
    ///
    /// ```
    /// use ffbsim_ffb::{EffectDefinition, EffectKind, ForceScale, TypeParams};
    ///
    /// let def = EffectDefinition::new("Constant Left", EffectKind::constant(-0.8));
    /// let native = ForceScale::polled().build(&def);
    /// assert_eq!(native.params, TypeParams::Constant { magnitude: -8_000 });
    /// ```
    pub fn build(&self, definition: &EffectDefinition) -> NativeEffect {
        NativeEffect {
            direction: STEERING_AXIS_DIRECTION,
            duration: definition.duration,
            envelope: Envelope::default(),
            params: self.type_params(&definition.kind),
        }
    }

    /// Builds the type-specific block for a kind.
    pub fn type_params(&self, kind: &EffectKind) -> TypeParams {
        match *kind {
            EffectKind::Constant { level } => TypeParams::Constant {
                magnitude: self.scale(level),
            },
            EffectKind::Periodic {
                waveform,
                magnitude,
                period_ms,
                phase,
            } => TypeParams::Periodic {
                waveform,
                magnitude: self.magnitude(magnitude),
                offset: 0,
                phase: phase_centidegrees(phase),
                period_us: period_ms.saturating_mul(1_000),
            },
            EffectKind::Ramp { start, end } => TypeParams::Ramp {
                start: self.scale(start),
                end: self.scale(end),
            },
            EffectKind::Condition {
                condition,
                coefficient,
                saturation,
                deadband,
            } => {
                let coefficient = self.scale(coefficient.max(0.0));
                let saturation = self.magnitude(saturation);
                TypeParams::Condition {
                    condition,
                    positive_coefficient: coefficient,
                    negative_coefficient: coefficient,
                    positive_saturation: saturation,
                    negative_saturation: saturation,
                    deadband: self.magnitude(deadband.max(0.0)),
                    offset: 0,
                }
            }
        }
    }

    /// Rebuilds the type-specific block of `kind` with its level replaced by
    /// `intensity`.
    ///
    /// Returns `None` for Ramp and Condition kinds, which are not updated
    /// while playing.
    ///
    /// # Examples
    ///
    /// ```
    /// use ffbsim_ffb::{EffectKind, ForceScale, TypeParams, Waveform};
    ///
    /// let force = ForceScale::polled();
    /// let sine = EffectKind::periodic(Waveform::Sine, 0.6, 200);
    /// let Some(TypeParams::Periodic { magnitude, period_us, .. }) = force.intensity_params(&sine, -0.65)
    /// else {
    ///     unreachable!()
    /// };
    /// assert_eq!((magnitude, period_us), (6_500, 200_000));
    ///
    /// assert_eq!(force.intensity_params(&EffectKind::ramp(0.2, 1.0), 0.5), None);
    /// ```
    pub fn intensity_params(&self, kind: &EffectKind, intensity: f32) -> Option<TypeParams> {
        match *kind {
            EffectKind::Constant { .. } => Some(self.type_params(&EffectKind::Constant { level: intensity })),
            EffectKind::Periodic {
                waveform,
                period_ms,
                phase,
                ..
            } => Some(self.type_params(&EffectKind::Periodic {
                waveform,
                magnitude: intensity,
                period_ms,
                phase,
            })),
            EffectKind::Ramp { .. } | EffectKind::Condition { .. } => None,
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "fraction of a turn is clamped to [0, 36000)"
)]
fn phase_centidegrees(phase: f32) -> u32 {
    if !phase.is_finite() {
        return 0;
    }
    let turn = f64::from(FULL_TURN_CENTIDEGREES);
    let centi = (f64::from(phase).rem_euclid(1.0) * turn).floor();
    (centi as u32).min(FULL_TURN_CENTIDEGREES - 1)
}
