// ============================================
// TIMING UTILITY - Performance Measurement
// ============================================
// Usage:
//   1. As a wrapper: let result = timed("operation_name", || { /* code */ });
//   2. Manual tracking: let timer = Timer::start("name"); ... timer.stop();
//   3. Quiet tracking: let timer = Timer::silent("name"); ... timer.elapsed_ms();
// ============================================

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Timer for measuring execution time
pub struct Timer {
    name: String,
    start: Instant,
    threshold_ms: u128,
    silent: bool,
    stopped: bool,
}

impl Timer {
    /// Create a new timer with a name
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            threshold_ms: 0,
            silent: false,
            stopped: false,
        }
    }

    /// Create a timer that only logs if execution exceeds threshold (in milliseconds)
    pub fn start_with_threshold(name: impl Into<String>, threshold_ms: u128) -> Self {
        let mut timer = Self::start(name);
        timer.threshold_ms = threshold_ms;
        timer
    }

    /// Create a silent timer (won't log, use elapsed() manually)
    pub fn silent(name: impl Into<String>) -> Self {
        let mut timer = Self::start(name);
        timer.silent = true;
        timer
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Stop the timer and log the result
    pub fn stop(mut self) -> Duration {
        let duration = self.start.elapsed();
        self.log_duration(duration);
        self.stopped = true;
        duration
    }

    fn log_duration(&self, duration: Duration) {
        if self.silent {
            return;
        }

        let ms = duration.as_millis();
        if ms < self.threshold_ms {
            return;
        }

        match ms {
            0..=100 => debug!(operation = %self.name, elapsed_ms = ms as u64, "completed"),
            101..=1000 => info!(operation = %self.name, elapsed_ms = ms as u64, "completed"),
            _ => warn!(operation = %self.name, elapsed_ms = ms as u64, "slow operation"),
        }
    }
}

// Auto-log on drop unless already stopped or silent
impl Drop for Timer {
    fn drop(&mut self) {
        if !self.stopped {
            self.log_duration(self.start.elapsed());
        }
    }
}

/// Time a synchronous closure
pub fn timed<F, R>(name: impl Into<String>, f: F) -> R
where
    F: FnOnce() -> R,
{
    let timer = Timer::start(name);
    let result = f();
    timer.stop();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_returns_closure_result() {
        assert_eq!(timed("sum", || (1..=10).sum::<u32>()), 55);
    }

    #[test]
    fn test_silent_timer_measures() {
        let timer = Timer::silent("sleep");
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.elapsed() >= Duration::from_millis(5));
        assert!(timer.stop() >= Duration::from_millis(5));
    }
}
