//! Bounded waiting for conditions driven by a background thread.

use std::time::{Duration, Instant};

/// Re-check `condition` every millisecond until it holds or `timeout` elapses.
///
/// Returns whether the condition was observed to hold.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::time::Duration;
/// use ffbsim_test_helpers::wait_until;
///
/// let flag = Arc::new(AtomicBool::new(false));
/// let setter = Arc::clone(&flag);
/// let handle = std::thread::spawn(move || setter.store(true, Ordering::SeqCst));
/// assert!(wait_until(Duration::from_secs(1), || flag.load(Ordering::SeqCst)));
/// handle.join().ok();
/// ```
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_until_immediate() {
        assert!(wait_until(Duration::ZERO, || true));
    }

    #[test]
    fn test_wait_until_times_out() {
        let start = Instant::now();
        assert!(!wait_until(Duration::from_millis(20), || false));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_wait_until_counts_attempts() {
        let mut calls = 0;
        assert!(wait_until(Duration::from_secs(1), || {
            calls += 1;
            calls >= 3
        }));
        assert_eq!(calls, 3);
    }
}
