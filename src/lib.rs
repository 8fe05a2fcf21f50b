//! # subpub
//!
//! **subpub** is an in-process publish/subscribe bus for Tokio applications.
//!
//! Callers subscribe a [`Handler`] to a named subject and receive asynchronous
//! deliveries whenever a message is published to that subject. The bus is the
//! delivery primitive a network adapter (gRPC, WebSocket, ...) sits on top of.
//!
//! ## Architecture
//! ```text
//!   subscribe(subject, handler)          publish(subject, msg)
//!            │                                   │
//!            ▼                                   ▼ (waits while full)
//! ┌──────────────────────────┐       ┌──────────────────────────┐
//! │ Registry (RwLock)        │       │ bounded publish queue    │
//! │  subject → [sub, sub..]  │       │  (global FIFO)           │
//! │  closed flag             │       └────────────┬─────────────┘
//! └────────────┬─────────────┘                    ▼
//!              │  read lock, snapshot,   ┌──────────────────────┐
//!              └───────────────────────► │ Dispatcher (1 task)  │
//!                        unlock          └───┬──────┬───────┬───┘
//!                                            ▼      ▼       ▼
//!                                        deliver deliver deliver   (one task each,
//!                                          h1      h2      hN       panics isolated)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Open ──close(deadline)──► Closing ──queue drained──► Closed
//!   │                          │
//!   │ subscribe/publish ok     │ subscribe/publish → BusError::Closed
//!   │                          │ blocked publish   → BusError::Closed
//!   │                          │ close() again     → Ok(()) immediately
//! ```
//!
//! ## Features
//! | Area              | Description                                                | Key types                                 |
//! |-------------------|------------------------------------------------------------|-------------------------------------------|
//! | **Bus**           | Subscribe, publish with backpressure, graceful close.      | [`Bus`], [`BusBuilder`], [`Subscription`] |
//! | **Handlers**      | Delivery capability, closure adapter.                      | [`Handler`], [`HandlerFn`], [`HandlerRef`]|
//! | **Streams**       | Subscription as a `Stream`, unsubscribes on drop.          | [`SubjectStream`]                         |
//! | **Events**        | Runtime events for observability.                          | [`Event`], [`EventKind`], [`LogWriter`]   |
//! | **Errors**        | Typed errors returned synchronously.                       | [`BusError`]                              |
//! | **Configuration** | Queue/event capacities, shutdown deadline.                 | [`Config`]                                |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use subpub::{Bus, HandlerFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), subpub::BusError> {
//!     let bus: Bus<String> = Bus::builder()
//!         .with_queue_capacity(64)
//!         .with_close_timeout(Duration::from_secs(2))
//!         .build();
//!
//!     let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//!     let sub = bus.subscribe("test", HandlerFn::arc("capture", move |msg: String| {
//!         let tx = tx.clone();
//!         async move {
//!             let _ = tx.send(msg);
//!         }
//!     }))?;
//!
//!     bus.publish("test", "hello".to_string()).await?;
//!     assert_eq!(rx.recv().await.as_deref(), Some("hello"));
//!
//!     sub.unsubscribe();
//!     bus.shutdown().await
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod handlers;
mod observers;
mod stream;

// ---- Public re-exports ----

pub use crate::config::Config;
pub use crate::core::{Bus, BusBuilder, Subscription};
pub use crate::error::BusError;
pub use crate::events::{Event, EventKind};
pub use crate::handlers::{Handler, HandlerFn, HandlerRef};
pub use crate::observers::LogWriter;
pub use crate::stream::SubjectStream;
