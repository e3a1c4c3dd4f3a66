//! # Function-backed command (`FnCommand`)
//!
//! [`FnCommand`] assembles a [`Command`] out of closures, hook by hook.
//! Handy for simple commands, wiring tests, and one-off glue where a named
//! struct would be ceremony.
//!
//! Unset hooks behave like the trait defaults, with one exception: with no
//! [`FnCommand::finished_when`] predicate the command **finishes on its
//! first run** (run-once semantics). Long-running commands must say so
//! explicitly.
//!
//! ## Example
//! ```rust
//! use commandeer::{Command, FnCommand};
//!
//! let mut ticks = 0u32;
//! let pulse = FnCommand::new("pulse")
//!     .on_execute(move |_ctx| ticks += 1)
//!     .finished_when(|ctx| ctx.is_timed_out());
//! assert_eq!(pulse.name(), "pulse");
//! ```

use std::borrow::Cow;

use crate::core::Context;

use super::command::Command;

type Hook = Box<dyn FnMut(&mut Context<'_>) + Send>;
type Predicate = Box<dyn Fn(&Context<'_>) -> bool + Send>;

/// Closure-backed command implementation.
pub struct FnCommand {
    name: Cow<'static, str>,
    init: Option<Hook>,
    exec: Option<Hook>,
    done: Option<Predicate>,
    end: Option<Hook>,
    interrupted: Option<Hook>,
}

impl FnCommand {
    /// Creates an empty command with the given name.
    ///
    /// Without further hooks it does nothing and finishes on its first run.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            init: None,
            exec: None,
            done: None,
            end: None,
            interrupted: None,
        }
    }

    /// Sets the one-time setup hook.
    pub fn on_initialize(mut self, f: impl FnMut(&mut Context<'_>) + Send + 'static) -> Self {
        self.init = Some(Box::new(f));
        self
    }

    /// Sets the per-tick work hook.
    pub fn on_execute(mut self, f: impl FnMut(&mut Context<'_>) + Send + 'static) -> Self {
        self.exec = Some(Box::new(f));
        self
    }

    /// Sets the finish predicate (default: finish on the first run).
    pub fn finished_when(mut self, f: impl Fn(&Context<'_>) -> bool + Send + 'static) -> Self {
        self.done = Some(Box::new(f));
        self
    }

    /// Sets the normal-completion teardown hook.
    pub fn on_end(mut self, f: impl FnMut(&mut Context<'_>) + Send + 'static) -> Self {
        self.end = Some(Box::new(f));
        self
    }

    /// Sets the interrupted teardown hook.
    pub fn on_interrupted(mut self, f: impl FnMut(&mut Context<'_>) + Send + 'static) -> Self {
        self.interrupted = Some(Box::new(f));
        self
    }
}

impl Command for FnCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, ctx: &mut Context<'_>) {
        if let Some(f) = self.init.as_mut() {
            f(ctx);
        }
    }

    fn execute(&mut self, ctx: &mut Context<'_>) {
        if let Some(f) = self.exec.as_mut() {
            f(ctx);
        }
    }

    fn is_finished(&self, ctx: &Context<'_>) -> bool {
        match self.done.as_ref() {
            Some(f) => f(ctx),
            None => true,
        }
    }

    fn end(&mut self, ctx: &mut Context<'_>) {
        if let Some(f) = self.end.as_mut() {
            f(ctx);
        }
    }

    fn interrupted(&mut self, ctx: &mut Context<'_>) {
        if let Some(f) = self.interrupted.as_mut() {
            f(ctx);
        }
    }
}
