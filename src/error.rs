//! Error types returned by the bus.
//!
//! There is a single enum, [`BusError`], covering both failure modes a caller can
//! observe synchronously:
//!
//! - [`BusError::Closed`]: `subscribe`/`publish` after closing has begun.
//! - [`BusError::DeadlineExceeded`]: `close` gave up waiting for the drain.
//!
//! Handler failures are never surfaced here: a panicking handler is isolated by the
//! dispatch engine and reported as [`EventKind::HandlerPanicked`](crate::EventKind).

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the bus.
///
/// Neither variant is retried internally; retry policy belongs to the caller.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The bus has begun (or finished) closing and accepts no new work.
    ///
    /// Non-retriable: the bus never reopens.
    #[error("bus is closed")]
    Closed,

    /// `close` did not observe the drain finishing before its deadline.
    ///
    /// The drain keeps running in the background; this means "shutdown not yet
    /// confirmed", not that the bus is broken.
    #[error("close deadline {deadline:?} exceeded before queued requests drained")]
    DeadlineExceeded {
        /// The deadline passed to `close`.
        deadline: Duration,
    },
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use subpub::BusError;
    ///
    /// assert_eq!(BusError::Closed.as_label(), "bus_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::Closed => "bus_closed",
            BusError::DeadlineExceeded { .. } => "bus_deadline_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BusError::Closed => "bus closed; no new subscriptions or publishes".to_string(),
            BusError::DeadlineExceeded { deadline } => {
                format!("drain still running after {deadline:?}")
            }
        }
    }

    /// Indicates whether the bus itself is permanently unavailable.
    ///
    /// `DeadlineExceeded` is not terminal for the bus: the drain continues.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use subpub::BusError;
    ///
    /// assert!(BusError::Closed.is_closed());
    /// assert!(!BusError::DeadlineExceeded { deadline: Duration::from_millis(10) }.is_closed());
    /// ```
    pub fn is_closed(&self) -> bool {
        matches!(self, BusError::Closed)
    }
}
