//! # Bus configuration.
//!
//! Provides [`Config`] centralized settings for a [`Bus`](crate::Bus).
//!
//! Config is used in two ways:
//! 1. **Direct construction**: `Bus::new(config)`
//! 2. **Builder**: `Bus::builder().with_queue_capacity(..).build()`
//!
//! ## Clamped values
//! - `queue_capacity = 0` → treated as 1 (a bounded channel needs at least one slot)
//! - `event_capacity = 0` → treated as 1

use std::time::Duration;

/// Configuration for a [`Bus`](crate::Bus).
///
/// ## Field semantics
/// - `queue_capacity`: pending publish requests before `publish` blocks (min 1)
/// - `close_timeout`: drain deadline used by [`Bus::shutdown`](crate::Bus::shutdown)
/// - `event_capacity`: runtime event ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the bounded publish queue.
    ///
    /// When the queue is full, `publish` waits for the dispatch engine to make
    /// room. There is no timeout on that wait.
    pub queue_capacity: usize,

    /// Deadline applied by [`Bus::shutdown`](crate::Bus::shutdown).
    ///
    /// `Bus::close` takes its own deadline and ignores this value.
    pub close_timeout: Duration,

    /// Capacity of the runtime event broadcast channel.
    ///
    /// Observers lagging more than `event_capacity` events skip the oldest ones.
    pub event_capacity: usize,
}

impl Config {
    /// Returns the publish queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Returns the event channel capacity clamped to a minimum of 1.
    #[inline]
    pub fn event_capacity_clamped(&self) -> usize {
        self.event_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `queue_capacity = 100`
    /// - `close_timeout = 5s`
    /// - `event_capacity = 1024`
    fn default() -> Self {
        Self {
            queue_capacity: 100,
            close_timeout: Duration::from_secs(5),
            event_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacities_are_clamped() {
        let cfg = Config {
            queue_capacity: 0,
            event_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.queue_capacity_clamped(), 1);
        assert_eq!(cfg.event_capacity_clamped(), 1);
    }

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.queue_capacity, 100);
        assert_eq!(cfg.close_timeout, Duration::from_secs(5));
        assert_eq!(cfg.event_capacity_clamped(), 1024);
    }
}
