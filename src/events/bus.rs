//! # Broadcast channel for runtime events.
//!
//! [`EventBus`] is a thin wrapper around [`tokio::sync::broadcast`] used by the
//! bus internals (registry writes, dispatch engine, delivery tasks, close) to
//! report what they are doing.
//!
//! ```text
//! Publishers (many):                     Observers (any):
//!   Bus::subscribe/unsubscribe ──┐
//!   Bus::publish / close       ──┼──► EventBus ──► Bus::events() receivers
//!   dispatch engine            ──┤  (broadcast)    └─► LogWriter
//!   delivery tasks (panics)    ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **No persistence**: events are lost if there are no receivers at send time.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` items.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with the given channel capacity (min 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
