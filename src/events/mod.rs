//! Runtime events: types and broadcast channel.
//!
//! This module groups the event **data model** and the **event bus** used to
//! report registry changes, dispatch outcomes, handler panics and shutdown progress.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`EventBus`] thin wrapper over `tokio::sync::broadcast`

mod bus;
mod event;

pub use bus::EventBus;
pub use event::{Event, EventKind};
