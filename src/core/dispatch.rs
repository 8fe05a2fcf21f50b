//! # Dispatch engine: sequential consumer, concurrent fan-out.
//!
//! A single [`Dispatcher`] task drains the bounded publish queue in global FIFO
//! order. For each request it takes a subscriber snapshot under the shared lock,
//! releases the lock, and spawns one delivery task per subscriber.
//!
//! ## Architecture
//! ```text
//! publish() ──► [bounded mpsc queue] ──► Dispatcher::run()
//!                                          │  read lock → snapshot → unlock
//!                                          ├──► spawn deliver(sub1) ──► handler1.deliver()
//!                                          ├──► spawn deliver(sub2) ──► handler2.deliver()
//!                                          └──► spawn deliver(subN) ──► handlerN.deliver()
//!                                                     └─ panic → HandlerPanicked
//! ```
//!
//! ## Rules
//! - **Global FIFO**: requests leave the queue in enqueue order, across all subjects
//! - **No per-subscriber ordering**: deliveries are independent tasks, so two messages
//!   to the same subscriber may complete in either order
//! - **Unknown subject**: empty snapshot, message dropped (`NoSubscribers`), not an error
//! - **Isolation**: a slow or panicking handler never stalls the loop or other deliveries
//! - **Drain**: the loop exits once every sender is gone and the queue is empty,
//!   then fires the `drained` token that `close` waits on
//!
//! ## Panic handling
//! Delivery tasks use `catch_unwind`; the panic payload is turned into a message,
//! logged and published as [`EventKind::HandlerPanicked`].
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a handler uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::any::Any;
use std::sync::{Arc, Weak};

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::bus::Shared;
use super::registry::Entry;
use crate::events::{Event, EventBus, EventKind};

/// Transient publish request: consumed exactly once by the dispatcher.
pub(crate) struct Request<M> {
    pub(crate) subject: Arc<str>,
    pub(crate) msg: M,
}

/// Sequential consumer of the publish queue.
pub(crate) struct Dispatcher<M>
where
    M: Send + Sync + 'static,
{
    rx: mpsc::Receiver<Request<M>>,
    /// Registry access; weak so the engine never keeps a dropped bus alive.
    shared: Weak<Shared<M>>,
    events: EventBus,
    drained: CancellationToken,
}

impl<M> Dispatcher<M>
where
    M: Send + Sync + 'static,
{
    pub(crate) fn new(
        rx: mpsc::Receiver<Request<M>>,
        shared: Weak<Shared<M>>,
        events: EventBus,
        drained: CancellationToken,
    ) -> Self {
        Self {
            rx,
            shared,
            events,
            drained,
        }
    }

    /// Drains the queue until every sender is dropped, then signals `drained`.
    pub(crate) async fn run(mut self) {
        while let Some(req) = self.rx.recv().await {
            self.dispatch(req);
        }

        debug!("dispatch queue drained");
        self.events.publish(Event::new(EventKind::Drained));
        self.drained.cancel();
    }

    /// Snapshots subscribers for one request and spawns a delivery per subscriber.
    fn dispatch(&self, req: Request<M>) {
        let subscribers = match self.shared.upgrade() {
            Some(shared) => shared.snapshot(&req.subject),
            None => Vec::new(),
        };

        if subscribers.is_empty() {
            trace!(subject = %req.subject, "no subscribers; message dropped");
            self.events
                .publish(Event::new(EventKind::NoSubscribers).with_subject(req.subject));
            return;
        }

        trace!(
            subject = %req.subject,
            subscribers = subscribers.len(),
            "dispatching"
        );

        let msg = Arc::new(req.msg);
        for entry in subscribers {
            tokio::spawn(deliver(
                entry,
                Arc::clone(&req.subject),
                Arc::clone(&msg),
                self.events.clone(),
            ));
        }
    }
}

/// Runs one handler invocation, converting a panic into an event.
async fn deliver<M>(entry: Arc<Entry<M>>, subject: Arc<str>, msg: Arc<M>, events: EventBus)
where
    M: Send + Sync + 'static,
{
    // Build the handler future inside the guard: a handler may panic before its first poll.
    let fut = async { entry.handler.deliver(msg.as_ref()).await };

    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
        let info = panic_message(&*panic_err);
        let handler = entry.handler.name();
        warn!(
            subject = %subject,
            handler,
            subscription = entry.id,
            panic = %info,
            "handler panicked"
        );
        events.publish(Event::handler_panicked(subject, handler, info));
    }
}

fn panic_message(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
