//! # Bus: subscription bookkeeping, publish queue and graceful close.
//!
//! The [`Bus`] owns the subject registry, the bounded publish queue and the
//! lifecycle flag. It spawns a single [`Dispatcher`] on construction.
//!
//! ## High-level architecture
//! ```text
//! subscribe(subject, handler) ── write lock ──► Registry.insert ──► Subscription
//! Subscription::unsubscribe()  ── write lock ──► Registry.remove (no-op if gone)
//!
//! publish(subject, msg):
//!   read lock: closed? ─► Err(Closed)
//!   reserve queue slot (blocks while full; Close wakes it with Err(Closed))
//!   read lock: closed? ─► Err(Closed)   (slot released)
//!   enqueue Request ─────────────────────────► Dispatcher (global FIFO)
//!
//! close(deadline):
//!   write lock: closed already? ─► Ok(())   (idempotent, no wait)
//!               closed = true, drop queue sender
//!   cancel `closing` (wakes blocked publishers)
//!   wait `drained` up to deadline:
//!     ├─ Ok               → Ok(())
//!     └─ deadline elapsed → Err(DeadlineExceeded), drain continues in background
//! ```
//!
//! ## Lifecycle
//! `Open` → `Closing` (queue draining, new work rejected) → `Closed` (queue drained).
//! `close` waits for dispatching to finish, never for handler bodies.
//!
//! ## Locking
//! One `std::sync::RwLock` guards the registry, the `closed` flag and the queue
//! sender. Critical sections are short and never span an `.await` or a handler
//! call. A poisoned lock is recovered: every critical section leaves the state
//! consistent before anything can panic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::builder::BusBuilder;
use super::dispatch::{Dispatcher, Request};
use super::registry::{Entry, Registry};
use super::subscription::Subscription;
use crate::config::Config;
use crate::error::BusError;
use crate::events::{Event, EventBus, EventKind};
use crate::handlers::HandlerRef;

/// Lock-protected part of the bus.
struct State<M>
where
    M: Send + Sync + 'static,
{
    registry: Registry<M>,
    /// Monotonic: false → true exactly once.
    closed: bool,
    /// Dropped on close so the dispatcher can observe the end of the queue.
    tx: Option<mpsc::Sender<Request<M>>>,
}

/// State shared between the bus, its subscriptions and the dispatcher.
pub(crate) struct Shared<M>
where
    M: Send + Sync + 'static,
{
    state: RwLock<State<M>>,
    events: EventBus,
    /// Cancelled when closing begins; wakes publishers blocked on a full queue.
    closing: CancellationToken,
    /// Cancelled by the dispatcher once the queue is drained.
    drained: CancellationToken,
    next_id: AtomicU64,
}

impl<M> Shared<M>
where
    M: Send + Sync + 'static,
{
    fn read(&self) -> RwLockReadGuard<'_, State<M>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State<M>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copies the subscriber list of a subject under the shared lock.
    pub(crate) fn snapshot(&self, subject: &str) -> Vec<Arc<Entry<M>>> {
        self.read().registry.snapshot(subject)
    }

    /// Removes a subscription; a missing entry is a no-op.
    pub(crate) fn unsubscribe(&self, subject: &Arc<str>, id: u64) {
        let removed = self.write().registry.remove(subject, id);
        if removed {
            debug!(subject = %subject, subscription = id, "unsubscribed");
            self.events.publish(
                Event::new(EventKind::Unsubscribed)
                    .with_subject(Arc::clone(subject))
                    .with_subscription(id),
            );
        }
    }

    /// Returns a queue sender, or `Closed` once closing has begun.
    fn sender(&self) -> Result<mpsc::Sender<Request<M>>, BusError> {
        let state = self.read();
        match (&state.tx, state.closed) {
            (Some(tx), false) => Ok(tx.clone()),
            _ => Err(BusError::Closed),
        }
    }
}

/// In-process publish/subscribe bus.
///
/// Construct it explicitly and share it by reference (or inside an `Arc`) with
/// whatever needs it. Subscriptions only hold a weak reference back to the bus.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use subpub::{Bus, Config, HandlerFn};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), subpub::BusError> {
///     let bus: Bus<String> = Bus::new(Config::default());
///
///     let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
///     let sub = bus.subscribe("greetings", HandlerFn::arc("printer", move |msg: String| {
///         let tx = tx.clone();
///         async move {
///             let _ = tx.send(msg);
///         }
///     }))?;
///
///     bus.publish("greetings", "hello".to_string()).await?;
///     assert_eq!(rx.recv().await.as_deref(), Some("hello"));
///
///     sub.unsubscribe();
///     bus.close(Duration::from_secs(1)).await
/// }
/// ```
pub struct Bus<M>
where
    M: Send + Sync + 'static,
{
    cfg: Config,
    shared: Arc<Shared<M>>,
}

impl<M> Bus<M>
where
    M: Send + Sync + 'static,
{
    /// Creates a bus and spawns its dispatch engine.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime (the dispatcher is spawned
    /// with [`tokio::spawn`]).
    pub fn new(cfg: Config) -> Self {
        let (bus, dispatcher) = Self::unstarted(cfg);
        tokio::spawn(dispatcher.run());
        bus
    }

    /// Returns a builder with default configuration.
    pub fn builder() -> BusBuilder<M> {
        BusBuilder::new(Config::default())
    }

    /// Creates the bus without spawning the dispatcher.
    pub(crate) fn unstarted(cfg: Config) -> (Self, Dispatcher<M>) {
        let (tx, rx) = mpsc::channel(cfg.queue_capacity_clamped());
        let events = EventBus::new(cfg.event_capacity_clamped());
        let drained = CancellationToken::new();

        let shared = Arc::new(Shared {
            state: RwLock::new(State {
                registry: Registry::new(),
                closed: false,
                tx: Some(tx),
            }),
            events: events.clone(),
            closing: CancellationToken::new(),
            drained: drained.clone(),
            next_id: AtomicU64::new(1),
        });

        let dispatcher = Dispatcher::new(rx, Arc::downgrade(&shared), events, drained);
        (Self { cfg, shared }, dispatcher)
    }

    /// Registers `handler` for every subsequent publish to `subject`.
    ///
    /// Any string is accepted as a subject, including the empty string.
    ///
    /// # Errors
    /// [`BusError::Closed`] once closing has begun.
    pub fn subscribe(
        &self,
        subject: &str,
        handler: HandlerRef<M>,
    ) -> Result<Subscription<M>, BusError> {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let name: Arc<str> = Arc::from(handler.name());
        {
            let mut state = self.shared.write();
            if state.closed {
                return Err(BusError::Closed);
            }
            state.registry.insert(subject, Entry::new(id, handler));
        }

        let subject: Arc<str> = Arc::from(subject);
        debug!(subject = %subject, subscription = id, handler = %name, "subscribed");
        self.shared.events.publish(
            Event::new(EventKind::Subscribed)
                .with_subject(Arc::clone(&subject))
                .with_subscription(id)
                .with_handler(name),
        );

        Ok(Subscription::new(id, subject, Arc::downgrade(&self.shared)))
    }

    /// Enqueues `msg` for delivery to the current subscribers of `subject`.
    ///
    /// Waits while the queue is full (backpressure, no timeout). Returns once the
    /// request is queued, not once it is delivered.
    ///
    /// # Errors
    /// [`BusError::Closed`] if closing has begun, including while this call was
    /// waiting for queue space.
    pub async fn publish(&self, subject: &str, msg: M) -> Result<(), BusError> {
        let tx = self.shared.sender()?;

        let permit = tokio::select! {
            biased;
            _ = self.shared.closing.cancelled() => return Err(BusError::Closed),
            permit = tx.reserve() => permit.map_err(|_| BusError::Closed)?,
        };

        let subject: Arc<str> = Arc::from(subject);
        {
            // Same lock as `close`: a request is either enqueued before the flag
            // flips (and drained) or rejected.
            let state = self.shared.read();
            if state.closed {
                return Err(BusError::Closed);
            }
            permit.send(Request {
                subject: Arc::clone(&subject),
                msg,
            });
        }

        trace!(subject = %subject, "published");
        self.shared
            .events
            .publish(Event::new(EventKind::Published).with_subject(subject));
        Ok(())
    }

    /// Stops accepting work and waits up to `deadline` for queued requests to be dispatched.
    ///
    /// Idempotent: once closing has begun, further calls return `Ok(())` immediately.
    /// Handler invocations already spawned are not awaited or cancelled.
    ///
    /// # Errors
    /// [`BusError::DeadlineExceeded`] if the drain is still running when `deadline`
    /// elapses. The drain continues in the background.
    pub async fn close(&self, deadline: Duration) -> Result<(), BusError> {
        {
            let mut state = self.shared.write();
            if state.closed {
                return Ok(());
            }
            state.closed = true;
            state.tx = None;
        }

        self.shared.closing.cancel();
        debug!(?deadline, "close requested");
        self.shared
            .events
            .publish(Event::new(EventKind::CloseRequested).with_deadline(deadline));

        match tokio::time::timeout(deadline, self.shared.drained.cancelled()).await {
            Ok(()) => Ok(()),
            Err(_) => {
                warn!(?deadline, "close deadline exceeded; drain continues");
                self.shared
                    .events
                    .publish(Event::new(EventKind::DrainDeadlineExceeded).with_deadline(deadline));
                Err(BusError::DeadlineExceeded { deadline })
            }
        }
    }

    /// Closes the bus with [`Config::close_timeout`].
    pub async fn shutdown(&self) -> Result<(), BusError> {
        self.close(self.cfg.close_timeout).await
    }

    /// Creates a receiver for runtime events emitted from now on.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.shared.events.subscribe()
    }

    /// True once closing has begun.
    pub fn is_closed(&self) -> bool {
        self.shared.read().closed
    }

    /// True once the dispatch engine has drained the queue and exited.
    pub fn is_drained(&self) -> bool {
        self.shared.drained.is_cancelled()
    }

    /// Number of subjects with at least one active subscription.
    pub fn subject_count(&self) -> usize {
        self.shared.read().registry.subject_count()
    }

    /// Number of active subscriptions for `subject`.
    pub fn subscriber_count(&self, subject: &str) -> usize {
        self.shared.read().registry.subscriber_count(subject)
    }

    /// Configuration this bus was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }
}
