//! Force feedback effect model for the wheel simulator
//!
//! Effects are described once in a normalized domain ([`EffectDefinition`])
//! and turned into native parameter blocks ([`NativeEffect`]) by a
//! session-wide [`ForceScale`]. Every effect built in one session must go
//! through the same scale so magnitudes stay comparable.
//!
//! ```
//! use ffbsim_ffb::{EffectDefinition, EffectKind, ForceScale, TypeParams, Waveform};
//!
//! let force = ForceScale::resident();
//! let sine = EffectDefinition::new("Sine", EffectKind::periodic(Waveform::Sine, 0.5, 200));
//! let native = force.build(&sine);
//! assert!(matches!(native.params, TypeParams::Periodic { magnitude: 16_383, .. }));
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod catalog;
pub mod constants;
pub mod effects;
pub mod params;
pub mod scale;

pub use catalog::default_effects;
pub use constants::*;
pub use effects::*;
pub use params::*;
pub use scale::*;
