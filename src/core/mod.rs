//! Bus core: registry, dispatch and lifecycle.
//!
//! The public API from this module is [`Bus`] (with its [`BusBuilder`]) and the
//! [`Subscription`] handle it returns.
//!
//! Internal modules:
//! - [`registry`]: subject → subscriptions map (no locking of its own);
//! - [`dispatch`]: sequential queue consumer and per-subscriber delivery tasks;
//! - [`bus`]: façade holding the lock, the queue and the lifecycle flag;
//! - [`subscription`]: cancellation handle;
//! - [`builder`]: optional construction helpers.

mod builder;
mod bus;
mod dispatch;
mod registry;
mod subscription;

pub use builder::BusBuilder;
pub use bus::Bus;
pub use subscription::Subscription;
