//! # Command abstraction.
//!
//! A [`Command`] is a unit of repeated work with an explicit lifecycle:
//! admitted by the scheduler, initialized once, executed every tick, and
//! torn down exactly once through either `end` (finished normally) or
//! `interrupted` (canceled or preempted).
//!
//! Hooks receive a [`Context`] for the command's own timing and for raising
//! deferred scheduling requests; hardware access stays inside the command's
//! own fields.
//!
//! ## Lifecycle
//! ```text
//! Scheduler::start(id) ──► queued ──► admitted (owns its subsystems)
//!
//! every tick while running:
//!   ├─ first tick only: initialize(ctx)     (timing starts here)
//!   ├─ execute(ctx)
//!   └─ is_finished(ctx)?
//!        ├─ true            ─► removed ─► end(ctx)
//!        └─ canceled before ─► removed ─► interrupted(ctx)
//!
//! after removal the command is idle again and may be restarted;
//! a restart runs initialize() afresh.
//! ```

use crate::core::Context;

/// Schedulable unit of repeated work.
///
/// Implement `execute` and `is_finished`; the remaining hooks default to
/// no-ops. A command that should run until canceled returns `false` from
/// `is_finished`; one that wants timeout semantics returns
/// [`Context::is_timed_out`].
///
/// # Example
/// ```rust
/// use commandeer::{Command, Context};
///
/// struct Settle {
///     position: f32,
/// }
///
/// impl Command for Settle {
///     fn name(&self) -> &str {
///         "settle"
///     }
///
///     fn execute(&mut self, _ctx: &mut Context<'_>) {
///         self.position *= 0.9;
///     }
///
///     fn is_finished(&self, _ctx: &Context<'_>) -> bool {
///         self.position.abs() < 0.01
///     }
/// }
/// ```
pub trait Command: Send + 'static {
    /// Stable, human-readable command name.
    ///
    /// Defaults to the concrete type name; a
    /// [`CommandSpec::with_name`](crate::CommandSpec::with_name) override
    /// takes precedence at registration.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// One-time setup, called on the first run after each (re)start.
    ///
    /// The command's timing starts just before this hook: `ctx` reports zero
    /// elapsed time here.
    fn initialize(&mut self, ctx: &mut Context<'_>) {
        let _ = ctx;
    }

    /// Per-tick work, called on every run while the command is active.
    fn execute(&mut self, ctx: &mut Context<'_>);

    /// Finish predicate, consulted after every `execute`.
    ///
    /// Returning `true` removes the command this tick and fires `end`.
    fn is_finished(&self, ctx: &Context<'_>) -> bool;

    /// Normal-completion teardown.
    ///
    /// Fires exactly once per completed lifecycle, and only if the command
    /// ever initialized.
    fn end(&mut self, ctx: &mut Context<'_>) {
        let _ = ctx;
    }

    /// Interrupted teardown: the command was canceled or preempted.
    ///
    /// Exactly one of `end`/`interrupted` fires per completed lifecycle,
    /// never both.
    fn interrupted(&mut self, ctx: &mut Context<'_>) {
        let _ = ctx;
    }
}
