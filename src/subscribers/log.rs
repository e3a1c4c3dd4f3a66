//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [queued] command=blink id=3
//! [admitted] command=blink id=3 source=request
//! [rejected] command=grab id=7 reason=conflict subsystem=arm
//! [preempted] command=idle id=1 subsystem=led
//! [finished] command=raise id=5 elapsed=750ms
//! [interrupted] command=blink id=3 elapsed=1340ms
//! [tick-overrun] elapsed=31ms
//! [shutdown-requested]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::subscribe::Subscribe;

/// Stdout logging subscriber.
///
/// Enabled via the `logging` feature; intended for development and
/// examples. Implement a custom [`Subscribe`] for structured logging or
/// telemetry.
pub struct LogWriter;

fn ids(e: &Event) -> String {
    let name = e.command.as_deref().unwrap_or("?");
    match e.command_id {
        Some(id) => format!("command={name} id={}", id.value()),
        None => format!("command={name}"),
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::CommandQueued => {
                println!("[queued] {}", ids(e));
            }
            EventKind::CommandAdmitted => {
                let source = match e.source {
                    Some(crate::events::AdmissionSource::Default) => "default",
                    _ => "request",
                };
                println!("[admitted] {} source={source}", ids(e));
            }
            EventKind::AdmissionRejected => {
                print!("[rejected] {} reason={:?}", ids(e), e.reason.as_deref());
                match &e.subsystem {
                    Some(s) => println!(" subsystem={s}"),
                    None => println!(),
                }
            }
            EventKind::CommandPreempted => {
                println!(
                    "[preempted] {} subsystem={:?}",
                    ids(e),
                    e.subsystem.as_deref()
                );
            }
            EventKind::CommandFinished => {
                println!("[finished] {} elapsed={:?}ms", ids(e), e.elapsed_ms);
            }
            EventKind::CommandInterrupted => {
                println!("[interrupted] {} elapsed={:?}ms", ids(e), e.elapsed_ms);
            }
            EventKind::TickOverrun => {
                println!("[tick-overrun] elapsed={:?}ms", e.elapsed_ms);
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
