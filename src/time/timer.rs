//! # Stopwatch over a wrapping millisecond clock.
//!
//! [`Timer`] measures accumulated elapsed time like a stopwatch: it can be
//! started, stopped, and reset, and while stopped it holds the value frozen
//! at the last [`Timer::stop`]. Commands use it for their own pacing (blink
//! periods, settle delays); the scheduler uses the same clock for command
//! timeouts.
//!
//! ## Rollover
//! The underlying [`Clock`] is a 32-bit millisecond counter that wraps once
//! every [`CLOCK_ROLLOVER`]. A reading that appears to go backwards while the
//! timer is running is compensated by adding the rollover constant, so a
//! single wrap never corrupts the measured value.

use std::sync::Arc;
use std::time::Duration;

use super::clock::{Clock, SystemClock};

/// Period of the 32-bit millisecond counter: the point at which the clock
/// wraps back to zero (~49.7 days).
pub const CLOCK_ROLLOVER: Duration = Duration::from_millis(1 << 32);

const ROLLOVER_MS: u64 = 1 << 32;

/// Accumulating stopwatch.
///
/// While running, [`Timer::get`] returns the accumulated value plus the time
/// since the last start; while stopped it returns exactly the accumulated
/// value. Newly created timers are reset and **not** running.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use commandeer::{ManualClock, Timer};
///
/// let clock = Arc::new(ManualClock::new());
/// let mut timer = Timer::with_clock(clock.clone());
///
/// timer.start();
/// clock.advance(Duration::from_millis(300));
/// assert_eq!(timer.get(), Duration::from_millis(300));
///
/// timer.stop();
/// clock.advance(Duration::from_millis(999));
/// assert_eq!(timer.get(), Duration::from_millis(300)); // frozen
/// ```
pub struct Timer {
    clock: Arc<dyn Clock>,
    /// Last start reading, kept in u64 so that `has_period_elapsed` can
    /// advance it past the raw counter range without losing the wrap math.
    start: u64,
    accumulated: Duration,
    running: bool,
}

impl Timer {
    /// Creates a stopped, zeroed timer on the real monotonic clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Creates a stopped, zeroed timer on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let start = u64::from(clock.now_millis());
        Self {
            clock,
            start,
            accumulated: Duration::ZERO,
            running: false,
        }
    }

    /// Returns the current value of the timer.
    ///
    /// Running: accumulated time plus time since the last start, compensated
    /// for a single clock rollover. Stopped: the value frozen at the last
    /// [`Timer::stop`].
    pub fn get(&self) -> Duration {
        if !self.running {
            return self.accumulated;
        }

        let mut now = u64::from(self.clock.now_millis());
        // A reading behind the start means the counter rolled over.
        if now < self.start {
            now += ROLLOVER_MS;
        }
        self.accumulated + Duration::from_millis(now - self.start)
    }

    /// Zeroes the timer and re-anchors it at the current clock reading.
    ///
    /// Does not change whether the timer is running.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.start = u64::from(self.clock.now_millis());
    }

    /// Starts the timer. No-op if already running.
    pub fn start(&mut self) {
        if !self.running {
            self.start = u64::from(self.clock.now_millis());
            self.running = true;
        }
    }

    /// Stops the timer, freezing [`Timer::get`] at the current value.
    pub fn stop(&mut self) {
        let frozen = self.get();
        if self.running {
            self.accumulated = frozen;
            self.running = false;
        }
    }

    /// Returns true once the given period has elapsed, advancing the start
    /// anchor by exactly that period.
    ///
    /// Advancing by the period (rather than re-anchoring at "now") keeps
    /// periodic work from drifting later by however long the caller took to
    /// get around to checking.
    pub fn has_period_elapsed(&mut self, period: Duration) -> bool {
        if self.get() > period {
            self.start += period.as_millis() as u64;
            return true;
        }
        false
    }

    /// Whether the timer is currently running.
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::clock::ManualClock;

    fn timer() -> (Arc<ManualClock>, Timer) {
        let clock = Arc::new(ManualClock::new());
        let t = Timer::with_clock(clock.clone());
        (clock, t)
    }

    #[test]
    fn test_not_running_until_started() {
        let (clock, timer) = timer();
        clock.advance(Duration::from_millis(500));
        assert_eq!(timer.get(), Duration::ZERO);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_get_tracks_clock_while_running() {
        let (clock, mut timer) = timer();
        timer.start();
        clock.advance(Duration::from_millis(120));
        assert_eq!(timer.get(), Duration::from_millis(120));
        clock.advance(Duration::from_millis(30));
        assert_eq!(timer.get(), Duration::from_millis(150));
    }

    #[test]
    fn test_stop_freezes_and_start_resumes_accumulating() {
        let (clock, mut timer) = timer();
        timer.start();
        clock.advance(Duration::from_millis(100));
        timer.stop();

        clock.advance(Duration::from_millis(700));
        assert_eq!(timer.get(), Duration::from_millis(100));

        timer.start();
        clock.advance(Duration::from_millis(50));
        assert_eq!(timer.get(), Duration::from_millis(150));
    }

    #[test]
    fn test_reset_zeroes_but_keeps_running_state() {
        let (clock, mut timer) = timer();
        timer.start();
        clock.advance(Duration::from_millis(400));
        timer.reset();
        assert_eq!(timer.get(), Duration::ZERO);
        clock.advance(Duration::from_millis(25));
        assert_eq!(timer.get(), Duration::from_millis(25));
    }

    #[test]
    fn test_double_start_does_not_reanchor() {
        let (clock, mut timer) = timer();
        timer.start();
        clock.advance(Duration::from_millis(80));
        timer.start();
        assert_eq!(timer.get(), Duration::from_millis(80));
    }

    #[test]
    fn test_rollover_is_compensated() {
        let clock = Arc::new(ManualClock::starting_at(u32::MAX - 999));
        let mut timer = Timer::with_clock(clock.clone());
        timer.start();
        // Cross the wrap: 1000ms forward lands the counter at 0.
        clock.advance(Duration::from_millis(1_500));
        assert_eq!(timer.get(), Duration::from_millis(1_500));
    }

    #[test]
    fn test_has_period_elapsed_advances_without_drift() {
        let (clock, mut timer) = timer();
        timer.start();
        let period = Duration::from_millis(100);

        assert!(!timer.has_period_elapsed(period));

        // Check late: 250ms in. One period fires, anchor advances by exactly
        // 100ms, so the next period is already 150ms deep.
        clock.advance(Duration::from_millis(250));
        assert!(timer.has_period_elapsed(period));
        assert_eq!(timer.get(), Duration::from_millis(150));
        assert!(timer.has_period_elapsed(period));
        assert_eq!(timer.get(), Duration::from_millis(50));
        assert!(!timer.has_period_elapsed(period));
    }

    #[test]
    fn test_stopped_timer_holds_exact_stop_value() {
        let (clock, mut timer) = timer();
        timer.start();
        clock.advance(Duration::from_millis(333));
        timer.stop();
        timer.stop(); // second stop is a no-op
        assert_eq!(timer.get(), Duration::from_millis(333));
    }
}
