//! # Subsystem: a named exclusive resource.
//!
//! A subsystem stands for one piece of shared hardware (an LED strip, a
//! drivetrain, a pin bank) that must never be driven by two commands at
//! once. The scheduler is the only writer of the ownership pointer; user
//! code declares requirements on a [`CommandSpec`](crate::CommandSpec) and
//! reads ownership through the scheduler's queries.
//!
//! ## Rules
//! - At most one command owns a subsystem at any time.
//! - A subsystem's default command, if set, should require only that
//!   subsystem; the scheduler enforces at least that it requires it.
//! - `current_command_changed` is an observation flag for external
//!   consumers (dashboards, logs); the scheduler resets it at the end of
//!   every tick. It carries no weight in arbitration.

use std::sync::Arc;

use super::ids::CommandId;

/// Named exclusive resource tracked by the scheduler.
///
/// Construct with [`Subsystem::new`] and hand to
/// [`Scheduler::register`](crate::Scheduler::register), which returns the
/// [`SubsystemId`](crate::SubsystemId) used everywhere else.
#[derive(Debug)]
pub struct Subsystem {
    name: Arc<str>,
    current: Option<CommandId>,
    default: Option<CommandId>,
    current_changed: bool,
    default_initialized: bool,
}

impl Subsystem {
    /// Creates an unregistered subsystem with the given display name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            current: None,
            default: None,
            current_changed: false,
            default_initialized: false,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// The command currently granted ownership, if any.
    pub fn current_command(&self) -> Option<CommandId> {
        self.current
    }

    /// The configured default command, if any.
    pub fn default_command(&self) -> Option<CommandId> {
        self.default
    }

    /// Whether ownership changed since the last tick's confirmation.
    pub fn current_command_changed(&self) -> bool {
        self.current_changed
    }

    /// Whether the default command has been granted at least once.
    pub fn default_initialized(&self) -> bool {
        self.default_initialized
    }

    /// Ownership writes happen only on the scheduler's admission/removal
    /// path.
    pub(crate) fn set_current(&mut self, command: Option<CommandId>) {
        self.current = command;
        self.current_changed = true;
    }

    pub(crate) fn set_default(&mut self, command: Option<CommandId>) {
        self.default = command;
    }

    pub(crate) fn mark_default_initialized(&mut self) {
        self.default_initialized = true;
    }

    /// Resets the change-observation flag; called once per tick after the
    /// default-command phase.
    pub(crate) fn confirm(&mut self) {
        self.current_changed = false;
    }
}
