//! # Core subscriber trait.
//!
//! `Subscribe` is the extension point for watching the scheduler from the
//! outside: loggers, dashboards, telemetry bridges. Each subscriber is
//! driven by a dedicated worker loop fed from a bounded queue owned by the
//! [`SubscriberSet`](crate::SubscriberSet), so a slow subscriber never
//! stalls the tick loop or its peers.
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching); they only delay their own
//!   queue.
//! - Each subscriber declares its queue capacity via
//!   [`Subscribe::queue_capacity`]; on overflow, events for that subscriber
//!   are dropped.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task; prefer async I/O and
/// cooperative waits over blocking.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        256
    }
}
