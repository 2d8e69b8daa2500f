//! Device connection shared by the foreground session and the poller

use std::sync::atomic::{AtomicU64, Ordering};

use ffbsim_errors::DeviceResult;
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, trace, warn};

use crate::device::{DeviceSample, ForceFeedbackDevice};
use crate::state::{AcquisitionCell, AcquisitionState};

/// What one polling tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Ownership was (re)gained; no sample was read this tick
    Acquired,
    /// Acquisition failed; the tick was skipped
    AcquireFailed,
    /// A fresh sample replaced the cached one
    Sampled,
    /// The poll reported lost ownership
    Lost,
    /// The poll failed for another reason; the cached sample is kept
    PollFailed,
}

/// The device plus the state both loops read and write
pub struct DeviceLink {
    device: Mutex<Box<dyn ForceFeedbackDevice>>,
    state: AcquisitionCell,
    sample: Mutex<DeviceSample>,
    ticks: AtomicU64,
    losses: AtomicU64,
}

impl DeviceLink {
    pub fn new(device: Box<dyn ForceFeedbackDevice>) -> Self {
        Self {
            device: Mutex::new(device),
            state: AcquisitionCell::default(),
            sample: Mutex::new(DeviceSample::default()),
            ticks: AtomicU64::new(0),
            losses: AtomicU64::new(0),
        }
    }

    /// Locks the device for a sequence of native calls.
    pub fn device(&self) -> MutexGuard<'_, Box<dyn ForceFeedbackDevice>> {
        self.device.lock()
    }

    pub fn state(&self) -> AcquisitionState {
        self.state.get()
    }

    pub fn set_state(&self, state: AcquisitionState) -> AcquisitionState {
        self.state.set(state)
    }

    /// Records an ownership loss. The device drops every playing effect
    /// when it takes ownership back.
    pub fn mark_lost(&self) {
        if self.state.set(AcquisitionState::Lost) != AcquisitionState::Lost {
            self.losses.fetch_add(1, Ordering::AcqRel);
            warn!("Device ownership lost");
        }
    }

    /// Number of transitions into `Lost` so far.
    pub fn losses(&self) -> u64 {
        self.losses.load(Ordering::Acquire)
    }

    /// Most recent sample; may be one polling period old.
    pub fn sample(&self) -> DeviceSample {
        *self.sample.lock()
    }

    /// Number of completed polling ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Tries to take ownership. A failure leaves the state untouched.
    pub fn acquire(&self) -> DeviceResult {
        let result = self.device.lock().acquire();
        match &result {
            Ok(()) => {
                let previous = self.state.set(AcquisitionState::Acquired);
                if previous != AcquisitionState::Acquired {
                    info!(previous = %previous, "Device acquired");
                }
            }
            Err(err) => trace!(error = %err, "Acquire failed"),
        }
        result
    }

    /// One polling cycle: acquire when not owned, otherwise sample.
    pub fn tick(&self) -> TickOutcome {
        let outcome = if self.state.is_acquired() {
            self.poll_once()
        } else if self.acquire().is_ok() {
            TickOutcome::Acquired
        } else {
            TickOutcome::AcquireFailed
        };
        self.ticks.fetch_add(1, Ordering::AcqRel);
        outcome
    }

    fn poll_once(&self) -> TickOutcome {
        let result = self.device.lock().poll();
        match result {
            Ok(sample) => {
                *self.sample.lock() = sample;
                TickOutcome::Sampled
            }
            Err(err) if err.is_ownership_loss() => {
                debug!(error = %err, "Poll reported ownership loss");
                self.mark_lost();
                TickOutcome::Lost
            }
            Err(err) => {
                debug!(error = %err, "Poll failed");
                TickOutcome::PollFailed
            }
        }
    }
}

impl std::fmt::Debug for DeviceLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceLink")
            .field("state", &self.state.get())
            .field("ticks", &self.ticks())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use ffbsim_ffb::{EffectKind, EffectDefinition, ForceScale};
    use tracing_test::traced_test;

    use super::*;
    use crate::virtual_wheel::VirtualWheelControl;

    fn link() -> (DeviceLink, VirtualWheelControl) {
        let wheel = VirtualWheelControl::sidewinder();
        (DeviceLink::new(Box::new(wheel.device())), wheel)
    }

    #[test]
    fn test_first_tick_acquires_without_sampling() {
        let (link, wheel) = link();
        wheel.set_sample(DeviceSample {
            axis: 42,
            ..DeviceSample::default()
        });
        assert_eq!(link.tick(), TickOutcome::Acquired);
        assert_eq!(link.state(), AcquisitionState::Acquired);
        assert_eq!(link.sample().axis, 0);

        assert_eq!(link.tick(), TickOutcome::Sampled);
        assert_eq!(link.sample().axis, 42);
        assert_eq!(link.ticks(), 2);
    }

    #[test]
    #[traced_test]
    fn test_loss_then_recovery() {
        let (link, wheel) = link();
        assert_eq!(link.tick(), TickOutcome::Acquired);

        wheel.revoke_ownership();
        assert_eq!(link.tick(), TickOutcome::Lost);
        assert_eq!(link.state(), AcquisitionState::Lost);
        assert_eq!(link.losses(), 1);
        assert!(logs_contain("Device ownership lost"));

        assert_eq!(link.tick(), TickOutcome::AcquireFailed);
        assert_eq!(link.state(), AcquisitionState::Lost);

        link.mark_lost();
        assert_eq!(link.losses(), 1);

        wheel.restore_ownership();
        assert_eq!(link.tick(), TickOutcome::Acquired);
        assert_eq!(link.state(), AcquisitionState::Acquired);

        link.mark_lost();
        assert_eq!(link.losses(), 2);
    }

    #[test]
    fn test_poll_failure_keeps_sample_and_state() {
        let (link, wheel) = link();
        link.tick();
        wheel.set_sample(DeviceSample {
            buttons: 0b10,
            ..DeviceSample::default()
        });
        link.tick();

        wheel.fail_polls(true);
        assert_eq!(link.tick(), TickOutcome::PollFailed);
        assert_eq!(link.sample().buttons, 0b10);
        assert_eq!(link.state(), AcquisitionState::Acquired);
    }

    #[test]
    fn test_device_guard_reaches_backend() {
        let (link, wheel) = link();
        let native = ForceScale::polled().build(&EffectDefinition::new("C", EffectKind::constant(0.5)));
        let created = link.device().create_effect(&native);
        assert!(created.is_ok());
        assert_eq!(wheel.resident_count(), 1);
    }
}
