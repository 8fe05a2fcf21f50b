//! # Handler abstractions.
//!
//! This module provides the delivery capability invoked by the dispatch engine:
//! - [`Handler`] - trait with a single async `deliver` method
//! - [`HandlerFn`] - closure-backed handler implementation
//! - [`HandlerRef`] - shared reference to a handler (`Arc<dyn Handler<M>>`)

mod handler;
mod handler_fn;

pub use handler::{Handler, HandlerRef};
pub use handler_fn::HandlerFn;
