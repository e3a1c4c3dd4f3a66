//! # Identities for commands, subsystems, and aggregate owners.
//!
//! Raw pointers in this problem space become small copyable ids resolved
//! through the scheduler-owned collections. [`CommandId`] and [`GroupId`]
//! are drawn from process-wide counters and are never reused, so they stay
//! valid as equality keys across restarts of the same command.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counter behind [`CommandId::next`].
static COMMAND_SEQ: AtomicU64 = AtomicU64::new(0);

/// Process-wide counter behind [`GroupId::next`].
static GROUP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Stable identity of a registered command.
///
/// Assigned at registration from a process-wide monotonically increasing
/// counter: across any N registrations, all N ids are distinct and strictly
/// increasing in registration order, even across multiple schedulers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandId(u64);

impl CommandId {
    pub(crate) fn next() -> Self {
        Self(COMMAND_SEQ.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw sequence number (for logs and event correlation).
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Identity of a subsystem within the scheduler that registered it.
///
/// An index into the owning scheduler's subsystem table; ids from one
/// scheduler are meaningless to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubsystemId(pub(crate) usize);

/// Opaque identity of an aggregate command owner.
///
/// Aggregates (command groups) live outside this crate; the scheduler only
/// records which group owns a command so that direct `start`/`cancel` on an
/// owned command can be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupId(u64);

impl GroupId {
    /// Mints a fresh owner identity.
    pub fn next() -> Self {
        Self(GROUP_SEQ.fetch_add(1, Ordering::Relaxed))
    }
}
