//! # Context handed to command hooks.
//!
//! Every [`Command`](crate::Command) hook receives a [`Context`]: a narrow
//! window onto the scheduler that exposes the command's own timing and lets
//! hooks raise deferred `start`/`cancel` requests. Hooks never touch the
//! scheduler directly — there is no global instance to reach for — so the
//! context is the only channel back into scheduling.
//!
//! ## Deferred requests
//! - [`Context::start`] queues a command for admission. Requests raised
//!   during a preemption grant (for example, an `interrupted` teardown
//!   trying to start a replacement) are **dropped**, preventing unbounded
//!   recursive admission. Requests raised anywhere else surface in the same
//!   tick's admission phase.
//! - [`Context::cancel`] behaves like
//!   [`Scheduler::cancel`](crate::Scheduler::cancel): owner-checked, and a
//!   no-op for commands that are not running.

use std::time::Duration;

use crate::events::{Bus, Event, EventKind};

use super::ids::CommandId;

/// Per-hook view of the running command and channel for deferred requests.
pub struct Context<'a> {
    elapsed: Duration,
    timed_out: bool,
    in_admission: bool,
    starts: &'a mut Vec<CommandId>,
    cancels: &'a mut Vec<CommandId>,
    bus: &'a Bus,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        elapsed: Duration,
        timed_out: bool,
        in_admission: bool,
        starts: &'a mut Vec<CommandId>,
        cancels: &'a mut Vec<CommandId>,
        bus: &'a Bus,
    ) -> Self {
        Self {
            elapsed,
            timed_out,
            in_admission,
            starts,
            cancels,
            bus,
        }
    }

    /// Time since this command initialized (zero on the initializing tick).
    pub fn time_since_initialized(&self) -> Duration {
        self.elapsed
    }

    /// True once the elapsed time has reached the command's configured
    /// timeout; always false when no timeout is set.
    ///
    /// The scheduler never ends a command on its own — a finish predicate
    /// that wants timeout semantics returns this.
    pub fn is_timed_out(&self) -> bool {
        self.timed_out
    }

    /// Requests that another command be started.
    ///
    /// Applied after the current hook returns, with the same semantics as
    /// [`Scheduler::start`](crate::Scheduler::start). Dropped if raised
    /// while an admission grant is in progress.
    pub fn start(&mut self, id: CommandId) {
        if self.in_admission {
            self.bus.publish(
                Event::new(EventKind::AdmissionRejected)
                    .with_command_id(id)
                    .with_reason("reentrant"),
            );
            return;
        }
        if !self.starts.contains(&id) {
            self.starts.push(id);
        }
    }

    /// Requests that another command be canceled.
    ///
    /// Applied after the current hook returns, with the same semantics as
    /// [`Scheduler::cancel`](crate::Scheduler::cancel).
    pub fn cancel(&mut self, id: CommandId) {
        if !self.cancels.contains(&id) {
            self.cancels.push(id);
        }
    }
}
