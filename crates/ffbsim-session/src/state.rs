//! Acquisition state shared between the foreground loop and the poller

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Ownership of the device as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AcquisitionState {
    Unacquired = 0,
    Acquired = 1,
    Lost = 2,
}

impl AcquisitionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => AcquisitionState::Acquired,
            2 => AcquisitionState::Lost,
            _ => AcquisitionState::Unacquired,
        }
    }
}

impl fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionState::Unacquired => write!(f, "unacquired"),
            AcquisitionState::Acquired => write!(f, "acquired"),
            AcquisitionState::Lost => write!(f, "lost"),
        }
    }
}

/// Lock-free cell holding an [`AcquisitionState`]
#[derive(Debug)]
pub struct AcquisitionCell(AtomicU8);

impl AcquisitionCell {
    pub fn new(state: AcquisitionState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn get(&self) -> AcquisitionState {
        AcquisitionState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Stores `state` and returns the previous value.
    pub fn set(&self, state: AcquisitionState) -> AcquisitionState {
        AcquisitionState::from_u8(self.0.swap(state as u8, Ordering::AcqRel))
    }

    pub fn is_acquired(&self) -> bool {
        self.get() == AcquisitionState::Acquired
    }
}

impl Default for AcquisitionCell {
    fn default() -> Self {
        Self::new(AcquisitionState::Unacquired)
    }
}
