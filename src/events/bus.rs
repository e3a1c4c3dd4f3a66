//! # Event bus for broadcasting scheduling events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. The
//! scheduler publishes synchronously from inside `tick()` — `publish` is an
//! ordinary non-blocking call, so the core never awaits — while any number
//! of receivers (the subscriber fan-out, tests, ad-hoc probes) consume the
//! stream independently.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and never fails;
//!   with no receivers the event is simply dropped.
//! - **Bounded capacity**: one ring buffer holds the most recent events for
//!   all receivers; a receiver that falls more than `capacity` behind gets
//!   `RecvError::Lagged(n)` and skips the `n` oldest items.
//! - **No persistence**: subscribing only observes events published after
//!   the subscription.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for scheduling events.
///
/// Cheap to clone (the sender is `Arc`-backed); hand clones to the runner,
/// subscribers, or anything else that needs to publish or observe.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus with the given ring-buffer capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// Safe to call from synchronous code; with no receivers the event is
    /// dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates an independent receiver observing subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
