//! # commandeer
//!
//! **Commandeer** is a cooperative command scheduler for tick-driven control
//! loops: a handful of exclusive hardware resources ("subsystems"), units of
//! repeated work ("commands") that declare which resources they need, and a
//! scheduler that runs everything against a fixed polling tick while making
//! sure no resource is ever driven by two commands at once.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ CommandSpec  │   │ CommandSpec  │   │ CommandSpec  │
//!     │ (user cmd #1)│   │ (user cmd #2)│   │ (user cmd #3)│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ add()            ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Scheduler (explicitly owned, one per control loop)               │
//! │  - command arena (CommandId → lifecycle state + hooks)            │
//! │  - subsystem table (SubsystemId → owner / default command)        │
//! │  - running set (admission order) + admission queue (FIFO, dedup)  │
//! │  - Bus (broadcast events)                                         │
//! └──────┬──────────────────────┬─────────────────────────────┬───────┘
//!        │ tick()               │ publish(Event)              │
//!        ▼                      ▼                             ▼
//! ┌──────────────┐   ┌────────────────────────┐   ┌──────────────────┐
//! │    Runner    │   │   SubscriberSet        │   │  Subsystems own  │
//! │ (paced loop) │   │ (queue + worker per    │   │  at most one     │
//! │              │   │  subscriber)           │   │  command each    │
//! └──────────────┘   └────────────────────────┘   └──────────────────┘
//! ```
//!
//! ### Tick
//! ```text
//! Scheduler::tick()
//!   ├─ Run phase: every running command, in admission order
//!   │     initialize (first run) → execute → is_finished?
//!   │     finished/canceled → remove (release subsystems,
//!   │                         fire end | interrupted exactly once)
//!   ├─ Admission phase: drain queued starts (FIFO)
//!   │     non-interruptible conflict → drop attempt, no retry
//!   │     else → preempt interruptible owners, take every subsystem
//!   └─ Default phase: idle subsystems admit their default command
//! ```
//!
//! ## Features
//! | Area            | Description                                             | Key types / traits                  |
//! |-----------------|---------------------------------------------------------|-------------------------------------|
//! | **Commands**    | Lifecycle hooks, timeouts, requirements.                | [`Command`], [`CommandSpec`], [`FnCommand`] |
//! | **Arbitration** | Exclusive ownership, preemption, default fallback.      | [`Scheduler`], [`Subsystem`]        |
//! | **Pacing**      | Fixed-period polling loop with overrun reporting.       | [`Runner`], [`Config`]              |
//! | **Events**      | Observe admissions, drops, completions.                 | [`Event`], [`EventKind`], [`Bus`], [`Subscribe`] |
//! | **Time**        | Stopwatch with rollover compensation, injectable clock. | [`Timer`], [`Clock`], [`ManualClock`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Failure policy
//! The scheduling core reports nothing to callers: mutating a locked
//! command, starting an owned command, or losing an admission to a
//! non-interruptible owner are all **silent no-ops**, by design — a control
//! loop wants predictable flow, and an actuator has nowhere to return an
//! `Err` to. The event stream exists so humans and telemetry can still see
//! every drop.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use commandeer::{CommandSpec, Config, FnCommand, Scheduler, Subsystem};
//!
//! let mut sched = Scheduler::new(Config::default());
//! let led = sched.register(Subsystem::new("led"));
//!
//! // Fallback: hold the LED off whenever nothing else drives it.
//! let idle = sched.add(
//!     CommandSpec::new(
//!         FnCommand::new("led-off")
//!             .on_execute(|_ctx| { /* led.set(false) */ })
//!             .finished_when(|_ctx| false),
//!     )
//!     .requires(led),
//! );
//! sched.set_default_command(led, idle);
//!
//! // A bounded blink that owns the LED for two seconds.
//! let blink = sched.add(
//!     CommandSpec::new(
//!         FnCommand::new("blink")
//!             .on_execute(|_ctx| { /* led.toggle() */ })
//!             .finished_when(|ctx| ctx.is_timed_out()),
//!     )
//!     .requires(led)
//!     .with_timeout(Duration::from_secs(2)),
//! );
//!
//! sched.tick();
//! assert_eq!(sched.current_command(led), Some(idle));
//!
//! sched.start(blink);
//! sched.tick();
//! assert_eq!(sched.current_command(led), Some(blink)); // idle was preempted
//! ```
//!
//! Drive `tick()` yourself as above, or hand the scheduler to a [`Runner`]
//! to pace it at [`Config::tick_period`] under tokio.

mod commands;
mod core;
mod error;
mod events;
mod subscribers;
mod time;

// ---- Public re-exports ----

pub use crate::commands::{Command, CommandSpec, FnCommand};
pub use crate::core::{
    CommandId, Config, Context, GroupId, Runner, Scheduler, Subsystem, SubsystemId,
};
pub use crate::error::RunnerError;
pub use crate::events::{AdmissionSource, Bus, Event, EventKind};
pub use crate::subscribers::{Subscribe, SubscriberSet};
pub use crate::time::{Clock, ManualClock, SystemClock, Timer, CLOCK_ROLLOVER};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
