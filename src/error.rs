//! Error types for the runner surface.
//!
//! The scheduling core deliberately has no error type: invalid operations
//! there are silent no-ops (see the crate docs), because a control loop
//! prefers predictable flow over signaling. Errors exist only where the
//! crate touches the outside world — configuration validation and OS signal
//! registration in the [`Runner`](crate::Runner).

use thiserror::Error;

/// Errors produced by the pacing runner.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RunnerError {
    /// The configured tick period is zero; the runner cannot pace on it.
    #[error("tick period must be non-zero")]
    ZeroTickPeriod,

    /// OS signal listeners could not be registered.
    #[error("signal registration failed: {0}")]
    Signal(#[source] std::io::Error),
}

impl RunnerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use commandeer::RunnerError;
    ///
    /// assert_eq!(RunnerError::ZeroTickPeriod.as_label(), "runner_zero_tick_period");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RunnerError::ZeroTickPeriod => "runner_zero_tick_period",
            RunnerError::Signal(_) => "runner_signal_registration",
        }
    }
}
