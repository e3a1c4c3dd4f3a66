//! # Runner: the paced polling loop around the scheduler.
//!
//! The scheduler is synchronous and never paces itself; something has to
//! call [`Scheduler::tick`] on a steady beat. [`Runner`] is that something:
//! a single task that owns the scheduler outright — preserving the
//! one-logical-thread-of-control contract — and ticks it on a fixed
//! [`Config::tick_period`](crate::Config::tick_period).
//!
//! ## Shutdown paths
//! - [`Runner::run`] stops when the provided [`CancellationToken`] fires and
//!   hands the scheduler back for teardown (`remove_all`, inspection).
//! - [`Runner::run_until_signal`] additionally listens for OS termination
//!   signals (SIGINT/SIGTERM, Ctrl-C on other platforms), publishing
//!   [`EventKind::ShutdownRequested`] before stopping.
//!
//! Ticks that take longer than the period are reported as
//! [`EventKind::TickOverrun`]; the interval then delays rather than bursting
//! to catch up.

use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::RunnerError;
use crate::events::{Event, EventKind};

use super::scheduler::Scheduler;

/// Owns a [`Scheduler`] and drives it at the configured tick period.
///
/// ## Example
/// ```no_run
/// use commandeer::{Config, Runner, Scheduler};
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), commandeer::RunnerError> {
/// let sched = Scheduler::new(Config::default());
/// let runner = Runner::new(sched)?;
/// let mut sched = runner.run_until_signal().await?;
/// sched.remove_all();
/// # Ok(())
/// # }
/// ```
pub struct Runner {
    scheduler: Scheduler,
    period: Duration,
}

impl Runner {
    /// Wraps a scheduler, validating its tick period.
    pub fn new(scheduler: Scheduler) -> Result<Self, RunnerError> {
        let period = scheduler.config().tick_period;
        if period.is_zero() {
            return Err(RunnerError::ZeroTickPeriod);
        }
        Ok(Self { scheduler, period })
    }

    /// The wrapped scheduler (for staging commands before running).
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Mutable access to the wrapped scheduler.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Ticks the scheduler until the token is cancelled, then returns it.
    pub async fn run(mut self, token: CancellationToken) -> Scheduler {
        let bus = self.scheduler.bus();
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    let started = Instant::now();
                    self.scheduler.tick();
                    let took = started.elapsed();
                    if took > self.period {
                        bus.publish(Event::new(EventKind::TickOverrun).with_elapsed(took));
                    }
                }
            }
        }
        self.scheduler
    }

    /// Ticks the scheduler until an OS termination signal arrives, then
    /// returns it.
    ///
    /// Fails only if signal listeners cannot be registered.
    pub async fn run_until_signal(self) -> Result<Scheduler, RunnerError> {
        let token = CancellationToken::new();
        let bus = self.scheduler.bus();

        let loop_fut = self.run(token.clone());
        tokio::pin!(loop_fut);

        tokio::select! {
            scheduler = &mut loop_fut => Ok(scheduler),
            sig = wait_for_shutdown_signal() => {
                sig.map_err(RunnerError::Signal)?;
                bus.publish(Event::new(EventKind::ShutdownRequested));
                token.cancel();
                Ok(loop_fut.await)
            }
        }
    }
}

/// Completes when the process receives a termination signal.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }
    Ok(())
}

/// Completes when the process receives a termination signal.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandSpec, FnCommand};
    use crate::core::config::Config;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_zero_period_is_rejected() {
        let cfg = Config {
            tick_period: Duration::ZERO,
            ..Config::default()
        };
        let err = Runner::new(Scheduler::new(cfg)).err().unwrap();
        assert_eq!(err.as_label(), "runner_zero_tick_period");
    }

    #[tokio::test]
    async fn test_runner_ticks_until_cancelled() {
        let cfg = Config {
            tick_period: Duration::from_millis(5),
            ..Config::default()
        };
        let mut sched = Scheduler::new(cfg);

        let execs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&execs);
        let cmd = sched.add(CommandSpec::new(
            FnCommand::new("spin")
                .on_execute(move |_ctx| {
                    counter.fetch_add(1, Ordering::Relaxed);
                })
                .finished_when(|_ctx| false),
        ));
        sched.start(cmd);

        let runner = Runner::new(sched).unwrap();
        let token = CancellationToken::new();
        let stopper = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(60)).await;
            stopper.cancel();
        });

        let sched = runner.run(token).await;
        assert!(sched.ticks() >= 2, "only {} ticks ran", sched.ticks());
        assert!(execs.load(Ordering::Relaxed) >= 1);
        assert!(sched.is_running(cmd));
    }
}
