//! # Scheduler configuration.
//!
//! [`Config`] centralizes the few knobs the crate exposes. It is consumed at
//! [`Scheduler`](crate::Scheduler) construction; the
//! [`Runner`](crate::Runner) reads the tick period back through
//! [`Scheduler::config`](crate::Scheduler::config).
//!
//! ## Sentinel values
//! - `tick_period = 0` is rejected by [`Runner::new`](crate::Runner::new)
//!   (the scheduler itself does not pace ticks and ignores the field).
//! - `bus_capacity` is clamped to a minimum of 1 by the bus.

use std::time::Duration;

/// Configuration for a scheduler instance and its pacing runner.
#[derive(Clone, Debug)]
pub struct Config {
    /// Target interval between scheduler ticks.
    ///
    /// Only the [`Runner`](crate::Runner) consumes this; callers driving
    /// [`Scheduler::tick`](crate::Scheduler::tick) by hand control their own
    /// pacing. Ticks that take longer than the period are reported as
    /// [`EventKind::TickOverrun`](crate::EventKind::TickOverrun).
    pub tick_period: Duration,

    /// Capacity of the event bus ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe
    /// `Lagged` and skip the oldest items. Minimum 1 (clamped).
    pub bus_capacity: usize,
}

impl Config {
    /// Bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `tick_period = 20ms` (a 50 Hz control loop)
    /// - `bus_capacity = 256`
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(20),
            bus_capacity: 256,
        }
    }
}
