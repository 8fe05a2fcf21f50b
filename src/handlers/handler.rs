//! # Delivery capability.
//!
//! A [`Handler`] receives every message published to the subject it was
//! subscribed to. The dispatch engine calls [`Handler::deliver`] from a freshly
//! spawned task per delivery, so:
//!
//! - a slow handler never delays other subscribers or the dispatch loop;
//! - two deliveries to the same handler may run concurrently and complete out of order;
//! - a panic inside `deliver` is caught and reported as
//!   [`EventKind::HandlerPanicked`](crate::EventKind), nothing else is affected.

use std::sync::Arc;

use async_trait::async_trait;

/// Shared handle to a handler.
pub type HandlerRef<M> = Arc<dyn Handler<M>>;

/// # Single-method delivery capability.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use subpub::Handler;
///
/// struct Printer;
///
/// #[async_trait]
/// impl Handler<String> for Printer {
///     async fn deliver(&self, msg: &String) {
///         println!("got {msg}");
///     }
///
///     fn name(&self) -> &str { "printer" }
/// }
/// ```
#[async_trait]
pub trait Handler<M>: Send + Sync + 'static
where
    M: Send + Sync + 'static,
{
    /// Handles one delivered message.
    ///
    /// The message is shared between all subscribers of the same publish, hence
    /// the borrow.
    async fn deliver(&self, msg: &M);

    /// Human-readable name (for logs/events).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
