//! FFB constants and limits

/// Native magnitude range of a polled-acquisition device (DirectInput style)
pub const POLLED_PLATFORM_MAX: i32 = 10_000;

/// Native magnitude range of a resident-table device (Linux `ff_effect`)
pub const RESIDENT_PLATFORM_MAX: i32 = 32_767;

/// Duration applied when leaving `Infinite` through a duration adjustment
pub const DEFAULT_EFFECT_DURATION_MS: u32 = 2_000;

/// Duration of the built-in ramp effects
pub const RAMP_DURATION_MS: u32 = 3_000;

/// Shortest finite duration reachable by adjustment
pub const MIN_EFFECT_DURATION_MS: u32 = 100;

/// Longest finite duration reachable by adjustment
pub const MAX_EFFECT_DURATION_MS: u32 = 10_000;

/// Direction along the positive steering axis, in hundredths of a degree
pub const STEERING_AXIS_DIRECTION: u32 = 9_000;

/// One full turn in hundredths of a degree
pub const FULL_TURN_CENTIDEGREES: u32 = 36_000;

/// Microsoft vendor id
pub const SIDEWINDER_VID: u16 = 0x045E;

/// SideWinder Force Feedback Wheel product id
pub const SIDEWINDER_PID: u16 = 0x0034;

/// Case-insensitive product name fragment used when ids do not match
pub const SIDEWINDER_NAME_HINT: &str = "sidewinder";
