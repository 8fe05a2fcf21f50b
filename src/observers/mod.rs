//! # Event observers.
//!
//! Observers consume the runtime event stream returned by
//! [`Bus::events`](crate::Bus::events).
//!
//! - [`LogWriter`] forwards every event to `tracing`.

mod log;

pub use log::LogWriter;
