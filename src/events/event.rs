//! # Runtime events emitted by the bus.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Registry events**: subscriptions added and removed
//! - **Dispatch events**: requests accepted, dropped, handler failures
//! - **Shutdown events**: close requested, drain finished or deadline hit
//!
//! The [`Event`] struct carries additional metadata such as timestamps, subject,
//! handler name and reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are observed out of order.
//!
//! ## Example
//! ```rust
//! use subpub::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::HandlerPanicked)
//!     .with_subject("orders")
//!     .with_handler("audit")
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::HandlerPanicked);
//! assert_eq!(ev.subject.as_deref(), Some("orders"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registry events ===
    /// A subscription was registered.
    ///
    /// Sets:
    /// - `subject`: subject name
    /// - `subscription`: subscription id
    /// - `handler`: handler name
    Subscribed,

    /// A subscription was removed from the registry.
    ///
    /// Sets:
    /// - `subject`: subject name
    /// - `subscription`: subscription id
    Unsubscribed,

    // === Dispatch events ===
    /// A publish request was accepted into the queue.
    ///
    /// Sets:
    /// - `subject`: subject name
    Published,

    /// A request was dispatched to a subject with no subscribers (message dropped).
    ///
    /// Sets:
    /// - `subject`: subject name
    NoSubscribers,

    /// A handler panicked while processing a delivery.
    ///
    /// Sets:
    /// - `subject`: subject name
    /// - `handler`: handler name
    /// - `reason`: panic info/message
    HandlerPanicked,

    // === Shutdown events ===
    /// `close` flipped the bus into closing state.
    ///
    /// Sets:
    /// - `deadline_ms`: requested drain deadline (ms)
    CloseRequested,

    /// The dispatch engine drained the queue and exited.
    Drained,

    /// `close` returned before the drain finished.
    ///
    /// Sets:
    /// - `deadline_ms`: deadline that elapsed (ms)
    DrainDeadlineExceeded,
}

/// Runtime event with optional metadata.
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

    /// Subject the event relates to, if any.
    pub subject: Option<Arc<str>>,
    /// Subscription id, if applicable.
    pub subscription: Option<u64>,
    /// Handler name, if applicable.
    pub handler: Option<Arc<str>>,
    /// Human-readable reason (panic messages, etc.).
    pub reason: Option<Arc<str>>,
    /// Close deadline in milliseconds (compact).
    pub deadline_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            subject: None,
            subscription: None,
            handler: None,
            reason: None,
            deadline_ms: None,
        }
    }

    /// Attaches a subject name.
    #[inline]
    pub fn with_subject(mut self, subject: impl Into<Arc<str>>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Attaches a subscription id.
    #[inline]
    pub fn with_subscription(mut self, id: u64) -> Self {
        self.subscription = Some(id);
        self
    }

    /// Attaches a handler name.
    #[inline]
    pub fn with_handler(mut self, handler: impl Into<Arc<str>>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a close deadline (stored as milliseconds).
    #[inline]
    pub fn with_deadline(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.deadline_ms = Some(ms);
        self
    }

    /// Creates a handler panic event.
    #[inline]
    pub fn handler_panicked(subject: Arc<str>, handler: &str, info: String) -> Self {
        Event::new(EventKind::HandlerPanicked)
            .with_subject(subject)
            .with_handler(handler)
            .with_reason(info)
    }

    #[inline]
    pub fn is_handler_panic(&self) -> bool {
        matches!(self.kind, EventKind::HandlerPanicked)
    }
}
