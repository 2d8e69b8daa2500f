//! Operator-adjustable session parameters and their display strings

use ffbsim_ffb::{DEFAULT_EFFECT_DURATION_MS, EffectDuration};

use crate::config::SessionConfig;

/// Intensity, duration and direction as the operator last set them.
///
/// Direction and duration live here only; they are shown to the operator
/// but never pushed to a resident effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    intensity: f32,
    duration: EffectDuration,
    direction: f32,
    min_duration_ms: u32,
    max_duration_ms: u32,
}

impl Tuning {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            intensity: snap(config.initial_intensity.clamp(-1.0, 1.0)),
            duration: config.initial_duration,
            direction: 0.0,
            min_duration_ms: config.min_duration_ms,
            max_duration_ms: config.max_duration_ms,
        }
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn duration(&self) -> EffectDuration {
        self.duration
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    /// Adds `delta` and clamps to `[-1.0, 1.0]`. Returns the new value.
    ///
    /// # Examples
    ///
    /// ```
    /// use ffbsim_session::{SessionConfig, Tuning};
    ///
    /// let mut tuning = Tuning::from_config(&SessionConfig::default());
    /// tuning.adjust_intensity(0.05);
    /// tuning.adjust_intensity(0.05);
    /// assert_eq!(tuning.adjust_intensity(0.05), 0.65);
    /// assert_eq!(tuning.adjust_intensity(5.0), 1.0);
    /// ```
    pub fn adjust_intensity(&mut self, delta: f32) -> f32 {
        self.intensity = step(self.intensity, delta);
        self.intensity
    }

    /// Adds `delta` and clamps to `[-1.0, 1.0]`. Returns the new value.
    pub fn adjust_direction(&mut self, delta: f32) -> f32 {
        self.direction = step(self.direction, delta);
        self.direction
    }

    /// From `Infinite` jumps to the 2000 ms default; otherwise adds
    /// `delta_ms`. Either way the result is clamped to the configured
    /// limits.
    ///
    /// # Examples
    ///
    /// ```
    /// use ffbsim_ffb::EffectDuration;
    /// use ffbsim_session::{SessionConfig, Tuning};
    ///
    /// let config = SessionConfig {
    ///     initial_duration: EffectDuration::Infinite,
    ///     ..SessionConfig::default()
    /// };
    /// let mut tuning = Tuning::from_config(&config);
    /// assert_eq!(tuning.adjust_duration(-500), EffectDuration::Millis(2000));
    /// assert_eq!(tuning.adjust_duration(-500), EffectDuration::Millis(1500));
    /// assert_eq!(tuning.adjust_duration(60_000), EffectDuration::Millis(10_000));
    /// ```
    pub fn adjust_duration(&mut self, delta_ms: i32) -> EffectDuration {
        let next = match self.duration {
            EffectDuration::Infinite => i64::from(DEFAULT_EFFECT_DURATION_MS),
            EffectDuration::Millis(ms) => i64::from(ms) + i64::from(delta_ms),
        };
        let clamped = next.clamp(
            i64::from(self.min_duration_ms),
            i64::from(self.max_duration_ms),
        );
        self.duration = EffectDuration::Millis(u32::try_from(clamped).unwrap_or(self.max_duration_ms));
        self.duration
    }
}

/// Keeps repeated key-press steps on a 1e-4 grid.
fn snap(value: f32) -> f32 {
    (value * 10_000.0).round() / 10_000.0
}

fn step(value: f32, delta: f32) -> f32 {
    if delta.is_nan() {
        return value;
    }
    snap((value + delta).clamp(-1.0, 1.0))
}

/// `Center`, `Right (v)` or `Left (v)` for a raw signed direction.
///
/// # Examples
///
/// ```
/// use ffbsim_session::format_direction;
///
/// assert_eq!(format_direction(0), "Center");
/// assert_eq!(format_direction(2000), "Right (2000)");
/// assert_eq!(format_direction(-1000), "Left (-1000)");
/// ```
pub fn format_direction(raw: i32) -> String {
    match raw {
        0 => "Center".to_string(),
        r if r > 0 => format!("Right ({r})"),
        r => format!("Left ({r})"),
    }
}

/// Space-separated indices of pressed buttons, or `None`.
///
/// # Examples
///
/// ```
/// use ffbsim_session::format_buttons;
///
/// assert_eq!(format_buttons(0), "None");
/// assert_eq!(format_buttons(0b101), "0 2");
/// ```
pub fn format_buttons(mask: u32) -> String {
    let pressed: Vec<String> = (0..32)
        .filter(|bit| mask & (1 << bit) != 0)
        .map(|bit| bit.to_string())
        .collect();
    if pressed.is_empty() {
        "None".to_string()
    } else {
        pressed.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use ffbsim_test_helpers::assert_approx_eq;

    use super::*;

    #[test]
    fn test_three_steps_reach_sixty_five_percent() {
        let mut tuning = Tuning::from_config(&SessionConfig::default());
        for _ in 0..3 {
            tuning.adjust_intensity(0.05);
        }
        assert_approx_eq!(tuning.intensity(), 0.65, 1e-6);
    }

    #[test]
    fn test_intensity_clamps_at_both_ends() {
        let mut tuning = Tuning::from_config(&SessionConfig::default());
        for _ in 0..30 {
            tuning.adjust_intensity(0.05);
        }
        assert_approx_eq!(tuning.intensity(), 1.0, 1e-6);
        for _ in 0..60 {
            tuning.adjust_intensity(-0.05);
        }
        assert_approx_eq!(tuning.intensity(), -1.0, 1e-6);
    }

    #[test]
    fn test_nan_delta_ignored() {
        let mut tuning = Tuning::from_config(&SessionConfig::default());
        assert_approx_eq!(tuning.adjust_direction(f32::NAN), 0.0, 1e-6);
    }

    #[test]
    fn test_duration_clamps_low() {
        let mut tuning = Tuning::from_config(&SessionConfig::default());
        for _ in 0..10 {
            tuning.adjust_duration(-500);
        }
        assert_eq!(tuning.duration(), EffectDuration::Millis(100));
    }

    #[test]
    fn test_leaving_infinite_respects_limits() {
        let short = SessionConfig {
            initial_duration: EffectDuration::Infinite,
            min_duration_ms: 100,
            max_duration_ms: 1_000,
            ..SessionConfig::default()
        };
        let mut tuning = Tuning::from_config(&short);
        assert_eq!(tuning.adjust_duration(500), EffectDuration::Millis(1_000));

        let long = SessionConfig {
            initial_duration: EffectDuration::Infinite,
            min_duration_ms: 3_000,
            max_duration_ms: 10_000,
            ..SessionConfig::default()
        };
        let mut tuning = Tuning::from_config(&long);
        assert_eq!(tuning.adjust_duration(-500), EffectDuration::Millis(3_000));
    }

    #[test]
    fn test_direction_steps() {
        let mut tuning = Tuning::from_config(&SessionConfig::default());
        tuning.adjust_direction(-0.1);
        tuning.adjust_direction(-0.1);
        assert_approx_eq!(tuning.direction(), -0.2, 1e-6);
    }

    #[test]
    fn test_format_buttons_high_bit() {
        assert_eq!(format_buttons(1 << 31), "31");
    }
}
