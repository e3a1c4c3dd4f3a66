//! # Scheduling events emitted by the scheduler and runner.
//!
//! [`EventKind`] classifies event types across three categories:
//! - **Admission events**: queueing, grants, drops, preemption
//! - **Lifecycle events**: command completion and interruption
//! - **Runner events**: tick pacing and shutdown
//!
//! The [`Event`] struct carries kind-dependent metadata: command name and
//! id, subsystem name, a human-readable reason, the admission source, and
//! an elapsed duration.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Events are published synchronously from inside the tick,
//! so per-receiver order already matches scheduling order; use `seq` to
//! merge streams from several receivers.
//!
//! ## Relationship to the silent no-op policy
//! The scheduler never reports rejected or dropped operations to the caller
//! — a conflicting admission simply vanishes. Events are the only place such
//! drops are visible, and they carry no ability to retry or veto.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::core::CommandId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of scheduling events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Admission events ===
    /// A start request was accepted into the admission queue.
    ///
    /// Sets:
    /// - `command`, `command_id`
    CommandQueued,

    /// A command was granted every subsystem it requires and joined the
    /// running set.
    ///
    /// Sets:
    /// - `command`, `command_id`
    /// - `source`: whether this was a queued request or a default fallback
    CommandAdmitted,

    /// An admission attempt was dropped.
    ///
    /// Emitted when a required subsystem is held by a non-interruptible
    /// owner, or when a start request was raised from inside a grant.
    /// The candidate is not retried and the requester is not notified.
    ///
    /// Sets:
    /// - `command_id` (and `command` when the name is known)
    /// - `reason`: `"conflict"` or `"reentrant"`
    /// - `subsystem`: the blocking subsystem, for conflicts
    AdmissionRejected,

    /// A running command was canceled and removed so that a new admission
    /// could take one of its subsystems.
    ///
    /// Sets:
    /// - `command`, `command_id`: the evicted owner
    /// - `subsystem`: the contested subsystem
    CommandPreempted,

    // === Lifecycle events ===
    /// A command left the running set after reporting itself finished; its
    /// normal-completion teardown ran.
    ///
    /// Sets:
    /// - `command`, `command_id`
    /// - `elapsed`: time since the command initialized
    CommandFinished,

    /// A canceled command left the running set; its interrupted teardown
    /// ran.
    ///
    /// Sets:
    /// - `command`, `command_id`
    /// - `elapsed`: time since the command initialized
    CommandInterrupted,

    // === Runner events ===
    /// A scheduler tick took longer than the configured tick period.
    ///
    /// Sets:
    /// - `elapsed`: how long the tick actually took
    TickOverrun,

    /// The runner observed a termination signal and is shutting down.
    ///
    /// Sets: timestamps only.
    ShutdownRequested,
}

/// Where an admitted command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionSource {
    /// Explicitly started and drained from the admission queue.
    Request,
    /// Admitted as a subsystem's default fallback.
    Default,
}

/// Scheduling event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Display name of the command, if known.
    pub command: Option<Arc<str>>,
    /// Identity of the command, if applicable.
    pub command_id: Option<CommandId>,
    /// Name of the subsystem involved, if any.
    pub subsystem: Option<Arc<str>>,
    /// Human-readable reason (rejection cause, etc.).
    pub reason: Option<Arc<str>>,
    /// Source of an admission (request vs. default fallback).
    pub source: Option<AdmissionSource>,
    /// Elapsed duration in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            command: None,
            command_id: None,
            subsystem: None,
            reason: None,
            source: None,
            elapsed_ms: None,
        }
    }

    /// Attaches a command display name.
    #[inline]
    pub fn with_command(mut self, name: impl Into<Arc<str>>) -> Self {
        self.command = Some(name.into());
        self
    }

    /// Attaches a command identity.
    #[inline]
    pub fn with_command_id(mut self, id: CommandId) -> Self {
        self.command_id = Some(id);
        self
    }

    /// Attaches a subsystem name.
    #[inline]
    pub fn with_subsystem(mut self, name: impl Into<Arc<str>>) -> Self {
        self.subsystem = Some(name.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the admission source.
    #[inline]
    pub fn with_source(mut self, source: AdmissionSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Attaches an elapsed duration (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.elapsed_ms = Some(ms);
        self
    }
}
