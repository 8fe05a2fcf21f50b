//! # LogWriter: runtime events to `tracing`
//!
//! A minimal observer that drains a bus event receiver and emits one `tracing`
//! record per event. It never installs a tracing subscriber; that is up to the
//! application.
//!
//! ## Levels
//! ```text
//! DEBUG subscribed / unsubscribed / close-requested / drained
//! TRACE published / no-subscribers
//! WARN  handler-panicked / drain-deadline-exceeded / observer lagged
//! ```

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::events::{Event, EventKind};

/// Event writer observer.
#[derive(Default, Debug, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Spawns a task that writes every event received on `rx`.
    ///
    /// The task ends when the event channel closes (the bus and all of its
    /// in-flight deliveries are gone).
    pub fn spawn(self, mut rx: broadcast::Receiver<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => self.write(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "log writer lagged; events skipped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Writes a single event.
    pub fn write(&self, e: &Event) {
        let subject = e.subject.as_deref().unwrap_or("");
        match e.kind {
            EventKind::Subscribed => {
                debug!(
                    seq = e.seq,
                    subject,
                    subscription = e.subscription,
                    handler = e.handler.as_deref(),
                    "[subscribed]"
                );
            }
            EventKind::Unsubscribed => {
                debug!(seq = e.seq, subject, subscription = e.subscription, "[unsubscribed]");
            }
            EventKind::Published => {
                trace!(seq = e.seq, subject, "[published]");
            }
            EventKind::NoSubscribers => {
                trace!(seq = e.seq, subject, "[no-subscribers]");
            }
            EventKind::HandlerPanicked => {
                warn!(
                    seq = e.seq,
                    subject,
                    handler = e.handler.as_deref().unwrap_or("unknown"),
                    info = e.reason.as_deref().unwrap_or("unknown"),
                    "[handler-panicked]"
                );
            }
            EventKind::CloseRequested => {
                debug!(seq = e.seq, deadline_ms = e.deadline_ms, "[close-requested]");
            }
            EventKind::Drained => {
                debug!(seq = e.seq, "[drained]");
            }
            EventKind::DrainDeadlineExceeded => {
                warn!(seq = e.seq, deadline_ms = e.deadline_ms, "[drain-deadline-exceeded]");
            }
        }
    }
}
