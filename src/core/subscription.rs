//! # Subscription handle.
//!
//! Returned by [`Bus::subscribe`](crate::Bus::subscribe); the only way to cancel
//! interest in a subject.
//!
//! ## State machine
//! ```text
//! Active ──unsubscribe()──► Removed (terminal)
//! ```
//!
//! ## Rules
//! - Removal is explicit: dropping the handle does **not** unsubscribe
//! - `unsubscribe` is idempotent; later calls are no-ops
//! - Deliveries already snapshotted by the dispatcher may still land after removal
//! - The handle holds a weak reference to the bus and never keeps it alive

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use super::bus::Shared;

/// Live registration of a handler against a subject.
pub struct Subscription<M>
where
    M: Send + Sync + 'static,
{
    id: u64,
    subject: Arc<str>,
    bus: Weak<Shared<M>>,
    active: AtomicBool,
}

impl<M> Subscription<M>
where
    M: Send + Sync + 'static,
{
    pub(crate) fn new(id: u64, subject: Arc<str>, bus: Weak<Shared<M>>) -> Self {
        Self {
            id,
            subject,
            bus,
            active: AtomicBool::new(true),
        }
    }

    /// Bus-unique id of this subscription.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Subject this subscription listens on.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// False once [`unsubscribe`](Self::unsubscribe) has been called.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Removes this subscription from the registry.
    ///
    /// After this returns, messages published later are not delivered here.
    /// Deliveries already in flight are not cancelled.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(&self.subject, self.id);
        }
    }
}

impl<M> fmt::Debug for Subscription<M>
where
    M: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("subject", &self.subject)
            .field("active", &self.is_active())
            .finish()
    }
}
