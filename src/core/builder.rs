use std::marker::PhantomData;
use std::time::Duration;

use super::bus::Bus;
use crate::config::Config;
use crate::observers::LogWriter;

/// Builder for constructing a [`Bus`] with optional features.
pub struct BusBuilder<M> {
    cfg: Config,
    log_writer: bool,
    _msg: PhantomData<fn() -> M>,
}

impl<M> BusBuilder<M>
where
    M: Send + Sync + 'static,
{
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            log_writer: false,
            _msg: PhantomData,
        }
    }

    /// Sets the bounded publish queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.cfg.queue_capacity = capacity;
        self
    }

    /// Sets the deadline used by [`Bus::shutdown`].
    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.close_timeout = timeout;
        self
    }

    /// Sets the runtime event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.cfg.event_capacity = capacity;
        self
    }

    /// Forwards runtime events to `tracing` through a [`LogWriter`].
    pub fn with_log_writer(mut self) -> Self {
        self.log_writer = true;
        self
    }

    /// Builds the bus and spawns its dispatch engine (and the log writer, if enabled).
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> Bus<M> {
        let bus = Bus::new(self.cfg);
        if self.log_writer {
            LogWriter::new().spawn(bus.events());
        }
        bus
    }
}
