//! # Command specification for registration.
//!
//! [`CommandSpec`] bundles a boxed [`Command`] with everything the scheduler
//! needs to arbitrate it: an optional display-name override, an optional
//! timeout, the interruptible flag, and the required subsystems.
//!
//! ## Rules
//! - Requirements declared here (or via
//!   [`Scheduler::require`](crate::Scheduler::require) before the first
//!   start) are final once the command is locked; duplicates collapse.
//! - `timeout` is advisory: the scheduler reports it through
//!   [`Context::is_timed_out`](crate::Context::is_timed_out) and
//!   [`Scheduler::is_timed_out`](crate::Scheduler::is_timed_out) but never
//!   ends a command on its own.

use std::borrow::Cow;
use std::time::Duration;

use crate::core::SubsystemId;

use super::command::Command;

/// Specification for registering a command with the scheduler.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use commandeer::{Config, Scheduler, Subsystem, CommandSpec, FnCommand};
///
/// let mut sched = Scheduler::new(Config::default());
/// let arm = sched.register(Subsystem::new("arm"));
///
/// let raise = sched.add(
///     CommandSpec::new(
///         FnCommand::new("raise")
///             .on_execute(|_ctx| { /* step the actuator */ })
///             .finished_when(|ctx| ctx.is_timed_out()),
///     )
///     .requires(arm)
///     .with_timeout(Duration::from_millis(750))
///     .with_interruptible(false),
/// );
/// assert_eq!(sched.name_of(raise), Some("raise"));
/// ```
pub struct CommandSpec {
    command: Box<dyn Command>,
    name: Option<Cow<'static, str>>,
    timeout: Option<Duration>,
    interruptible: bool,
    requirements: Vec<SubsystemId>,
}

impl CommandSpec {
    /// Wraps a command with default scheduling parameters: no name override,
    /// no timeout, interruptible, no requirements.
    pub fn new(command: impl Command) -> Self {
        Self {
            command: Box::new(command),
            name: None,
            timeout: None,
            interruptible: true,
            requirements: Vec::new(),
        }
    }

    /// Overrides the display name (otherwise [`Command::name`] is used).
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the timeout reported once elapsed-since-initialize reaches it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets whether a conflicting admission may preempt this command
    /// (default: true).
    pub fn with_interruptible(mut self, interruptible: bool) -> Self {
        self.interruptible = interruptible;
        self
    }

    /// Declares a required subsystem. Duplicates collapse.
    pub fn requires(mut self, subsystem: SubsystemId) -> Self {
        if !self.requirements.contains(&subsystem) {
            self.requirements.push(subsystem);
        }
        self
    }

    #[allow(clippy::type_complexity)]
    pub(crate) fn into_parts(
        self,
    ) -> (
        Box<dyn Command>,
        Option<Cow<'static, str>>,
        Option<Duration>,
        bool,
        Vec<SubsystemId>,
    ) {
        (
            self.command,
            self.name,
            self.timeout,
            self.interruptible,
            self.requirements,
        )
    }
}
