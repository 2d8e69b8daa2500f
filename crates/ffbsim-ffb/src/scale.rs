//! Conversion between the normalized domain and a platform's native range

use serde::{Deserialize, Serialize};

use crate::constants::{POLLED_PLATFORM_MAX, RESIDENT_PLATFORM_MAX};

/// Products are snapped to this fraction of a native unit before truncation,
/// so `0.65_f32 * 10_000` lands on 6500 rather than 6499.
const SNAP: f64 = 1_000.0;

/// Scales a normalized value into `[-platform_max, platform_max]`.
///
/// `normalized` is clamped to `[-1.0, 1.0]` and the product is rounded
/// toward zero. NaN maps to zero.
///
/// # Examples
///
/// ```
/// use ffbsim_ffb::scale;
///
/// assert_eq!(scale(0.8, 10_000), 8_000);
/// assert_eq!(scale(-0.8, 10_000), -8_000);
/// assert_eq!(scale(2.0, 10_000), 10_000);
/// assert_eq!(scale(0.12345, 10_000), 1_234);
/// ```
#[allow(clippy::cast_possible_truncation, reason = "clamped to platform_max")]
pub fn scale(normalized: f32, platform_max: i32) -> i32 {
    if normalized.is_nan() {
        return 0;
    }
    let max = f64::from(platform_max.max(0));
    let product = f64::from(normalized.clamp(-1.0, 1.0)) * max;
    let snapped = ((product * SNAP).round() / SNAP).trunc();
    snapped.clamp(-max, max) as i32
}

/// Formats a raw native value as a percentage of `platform_max`, one decimal.
///
/// # Examples
///
/// ```
/// use ffbsim_ffb::format_percentage;
///
/// assert_eq!(format_percentage(6_500, 10_000), "65.0%");
/// assert_eq!(format_percentage(-16_384, 32_767), "-50.0%");
/// ```
pub fn format_percentage(raw: i32, platform_max: i32) -> String {
    if platform_max == 0 {
        return "0.0%".to_string();
    }
    let percentage = f64::from(raw) / f64::from(platform_max) * 100.0;
    format!("{percentage:.1}%")
}

/// Session-wide scale factor shared by every effect built in one session
///
/// # Examples
///
/// ```
/// use ffbsim_ffb::ForceScale;
///
/// let force = ForceScale::polled();
/// assert_eq!(force.scale(0.65), 6_500);
/// assert_eq!(force.format_force(force.scale(0.65)), "6500 (65.0%)");
/// assert_eq!(force.magnitude(-0.6), 6_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceScale {
    platform_max: i32,
}

impl ForceScale {
    /// Creates a scale for `platform_max`, which must be positive; values
    /// below one are raised to one.
    pub fn new(platform_max: i32) -> Self {
        Self {
            platform_max: platform_max.max(1),
        }
    }

    /// DirectInput-style range of ±10 000.
    pub fn polled() -> Self {
        Self::new(POLLED_PLATFORM_MAX)
    }

    /// Linux `ff_effect` range of ±32 767.
    pub fn resident() -> Self {
        Self::new(RESIDENT_PLATFORM_MAX)
    }

    pub fn platform_max(&self) -> i32 {
        self.platform_max
    }

    pub fn scale(&self, normalized: f32) -> i32 {
        scale(normalized, self.platform_max)
    }

    /// Unsigned magnitude for fields the native models store without sign.
    pub fn magnitude(&self, normalized: f32) -> u32 {
        self.scale(normalized).unsigned_abs()
    }

    pub fn format_percentage(&self, raw: i32) -> String {
        format_percentage(raw, self.platform_max)
    }

    /// Raw value followed by its percentage, e.g. `5000 (50.0%)`.
    pub fn format_force(&self, raw: i32) -> String {
        format!("{raw} ({})", self.format_percentage(raw))
    }
}

impl Default for ForceScale {
    fn default() -> Self {
        Self::polled()
    }
}
