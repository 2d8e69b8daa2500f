//! Built-in effect set covering every family the wheel understands

use crate::constants::RAMP_DURATION_MS;
use crate::effects::{ConditionType, EffectDefinition, EffectDuration, EffectKind, Waveform};

const CONDITION_SATURATION: f32 = 1.0;
const CONDITION_DEADBAND: f32 = 0.05;

/// The fourteen default effects, in navigation order.
///
/// Four constant forces, four periodic waveforms, two ramps and four
/// condition laws. Ramps last three seconds; everything else is infinite.
///
/// # Examples
///
/// ```
/// use ffbsim_ffb::default_effects;
///
/// let effects = default_effects();
/// assert_eq!(effects.len(), 14);
/// assert!(effects.iter().all(|e| e.validate().is_ok()));
/// ```
pub fn default_effects() -> Vec<EffectDefinition> {
    let ramp = EffectDuration::Millis(RAMP_DURATION_MS);
    let condition = |name: &str, ty: ConditionType, coefficient: f32| {
        EffectDefinition::new(
            name,
            EffectKind::condition(ty, coefficient, CONDITION_SATURATION, CONDITION_DEADBAND),
        )
    };

    vec![
        EffectDefinition::new("Constant Right", EffectKind::constant(0.8)),
        EffectDefinition::new("Constant Left", EffectKind::constant(-0.8)),
        EffectDefinition::new("Constant Strong", EffectKind::constant(1.0)),
        EffectDefinition::new("Constant Weak", EffectKind::constant(0.4)),
        EffectDefinition::new("Sine", EffectKind::periodic(Waveform::Sine, 0.6, 200)),
        EffectDefinition::new("Square", EffectKind::periodic(Waveform::Square, 0.7, 150)),
        EffectDefinition::new("Triangle", EffectKind::periodic(Waveform::Triangle, 0.5, 300)),
        EffectDefinition::new("Sawtooth Up", EffectKind::periodic(Waveform::SawtoothUp, 0.6, 180)),
        EffectDefinition::new("Ramp Up", EffectKind::ramp(0.2, 1.0)).with_duration(ramp),
        EffectDefinition::new("Ramp Down", EffectKind::ramp(1.0, 0.2)).with_duration(ramp),
        condition("Spring", ConditionType::Spring, 0.8),
        condition("Damper", ConditionType::Damper, 0.7),
        condition("Inertia", ConditionType::Inertia, 0.6),
        condition("Friction", ConditionType::Friction, 0.5),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::EffectType;

    #[test]
    fn test_names_unique() {
        let effects = default_effects();
        let names: HashSet<&str> = effects.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names.len(), effects.len());
    }

    #[test]
    fn test_family_counts() {
        let effects = default_effects();
        let count = |pred: fn(EffectType) -> bool| effects.iter().filter(|e| pred(e.effect_type())).count();
        assert_eq!(count(|t| t == EffectType::Constant), 4);
        assert_eq!(count(EffectType::is_periodic), 4);
        assert_eq!(count(|t| t == EffectType::Ramp), 2);
        assert_eq!(count(EffectType::is_condition), 4);
    }

    #[test]
    fn test_only_ramps_are_finite() {
        for effect in default_effects() {
            let finite = !effect.duration.is_infinite();
            assert_eq!(finite, effect.effect_type() == EffectType::Ramp, "{}", effect.name);
        }
    }
}
