//! Background acquisition and sampling thread
//!
//! One tick per interval. A tick that takes longer than the interval is
//! followed immediately by the next one; the loop never sleeps less than
//! the remainder of its period and never runs two ticks at once.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error, info};

use crate::link::DeviceLink;

/// Handle to the running poller thread. Dropping it stops and joins.
#[derive(Debug)]
pub struct PollingLoop {
    running: Arc<AtomicBool>,
    wake_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
    interval: Duration,
}

impl PollingLoop {
    /// Spawns the poller.
    ///
    /// # Errors
    ///
    /// Returns the OS error when the thread cannot be spawned.
    pub fn start(link: Arc<DeviceLink>, interval: Duration) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let (wake_tx, wake_rx) = channel::bounded::<()>(1);

        let thread_running = Arc::clone(&running);
        let thread = thread::Builder::new()
            .name("ffb-poller".to_string())
            .spawn(move || poller_thread_main(&link, &thread_running, &wake_rx, interval))?;

        Ok(Self {
            running,
            wake_tx: Some(wake_tx),
            thread: Some(thread),
            interval,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Signals the thread and waits for it to finish. Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        // Disconnecting wakes the thread out of its wait.
        self.wake_tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Polling thread panicked");
            }
        }
    }
}

impl Drop for PollingLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poller_thread_main(
    link: &DeviceLink,
    running: &AtomicBool,
    wake_rx: &Receiver<()>,
    interval: Duration,
) {
    info!(interval_ms = interval.as_millis(), "Polling loop started");

    while running.load(Ordering::Acquire) {
        let started = Instant::now();
        let outcome = link.tick();
        debug!(?outcome, "Poll tick");

        let remaining = interval.saturating_sub(started.elapsed());
        match wake_rx.recv_timeout(remaining) {
            Ok(()) | Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    info!(ticks = link.ticks(), "Polling loop stopped");
}

#[cfg(test)]
mod tests {
    use ffbsim_test_helpers::prelude::*;

    use super::*;
    use crate::state::AcquisitionState;
    use crate::virtual_wheel::VirtualWheelControl;

    #[test]
    fn test_poller_acquires_and_samples() -> TestResult {
        let wheel = VirtualWheelControl::sidewinder();
        let link = Arc::new(DeviceLink::new(Box::new(wheel.device())));
        let mut poller = PollingLoop::start(Arc::clone(&link), Duration::from_millis(2))?;

        assert!(wait_until(Duration::from_secs(2), || link.ticks() >= 3));
        assert_eq!(link.state(), AcquisitionState::Acquired);
        assert!(wheel.poll_count() >= 1);

        poller.stop();
        assert!(!poller.is_running());
        Ok(())
    }

    #[test]
    fn test_stop_returns_promptly_with_long_interval() -> TestResult {
        let wheel = VirtualWheelControl::sidewinder();
        let link = Arc::new(DeviceLink::new(Box::new(wheel.device())));
        let mut poller = PollingLoop::start(Arc::clone(&link), Duration::from_secs(30))?;

        assert!(wait_until(Duration::from_secs(2), || link.ticks() >= 1));
        let started = Instant::now();
        poller.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
        Ok(())
    }

    #[test]
    fn test_no_ticks_after_stop() -> TestResult {
        let wheel = VirtualWheelControl::sidewinder();
        let link = Arc::new(DeviceLink::new(Box::new(wheel.device())));
        let poller = PollingLoop::start(Arc::clone(&link), Duration::from_millis(1))?;
        assert!(wait_until(Duration::from_secs(2), || link.ticks() >= 2));
        drop(poller);

        let after_stop = link.ticks();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(link.ticks(), after_stop);
        Ok(())
    }
}
