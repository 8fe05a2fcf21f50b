//! # Subject streams.
//!
//! [`Bus::subscribe_stream`] turns a subscription into a [`Stream`] of messages,
//! which is the shape a server-streaming transport needs: each delivery is pushed
//! into a bounded channel and the consumer pulls at its own pace.
//!
//! ```text
//! Dispatcher ──► spawn deliver ──► StreamSink.deliver(msg)
//!                                      │ send (waits while buffer full)
//!                                      ▼
//!                                [mpsc buffer] ──► SubjectStream::poll_next
//! ```
//!
//! ## Rules
//! - Dropping the stream (client gone) unsubscribes it from the bus
//! - A push to a stream whose receiver is gone is discarded; the push never errors out
//!   the bus
//! - Pushes are concurrent deliveries, so the stream does not guarantee publish order

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::trace;

use crate::core::{Bus, Subscription};
use crate::error::BusError;
use crate::handlers::Handler;

/// Handler that forwards deliveries into a stream buffer.
struct StreamSink<M> {
    subject: Arc<str>,
    tx: mpsc::Sender<M>,
}

#[async_trait]
impl<M> Handler<M> for StreamSink<M>
where
    M: Clone + Send + Sync + 'static,
{
    async fn deliver(&self, msg: &M) {
        if self.tx.send(msg.clone()).await.is_err() {
            trace!(subject = %self.subject, "stream receiver gone; delivery discarded");
        }
    }

    fn name(&self) -> &str {
        "subject-stream"
    }
}

/// Stream of messages published to one subject.
///
/// Unsubscribes on drop.
pub struct SubjectStream<M>
where
    M: Send + Sync + 'static,
{
    inner: ReceiverStream<M>,
    subscription: Subscription<M>,
}

impl<M> SubjectStream<M>
where
    M: Send + Sync + 'static,
{
    /// Subject this stream listens on.
    pub fn subject(&self) -> &str {
        self.subscription.subject()
    }

    /// Underlying subscription handle.
    pub fn subscription(&self) -> &Subscription<M> {
        &self.subscription
    }

    /// Stops new deliveries. Messages already buffered can still be read.
    pub fn unsubscribe(&self) {
        self.subscription.unsubscribe();
    }
}

impl<M> Stream for SubjectStream<M>
where
    M: Send + Sync + 'static,
{
    type Item = M;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl<M> Drop for SubjectStream<M>
where
    M: Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

impl<M> Bus<M>
where
    M: Clone + Send + Sync + 'static,
{
    /// Subscribes to `subject` and returns the deliveries as a [`Stream`].
    ///
    /// `buffer` bounds the number of undelivered messages held for the consumer
    /// (min 1); when it is full, delivery tasks wait for the consumer.
    ///
    /// # Errors
    /// [`BusError::Closed`] once closing has begun.
    ///
    /// # Example
    /// ```rust
    /// use futures::StreamExt;
    /// use subpub::{Bus, Config};
    ///
    /// #[tokio::main(flavor = "current_thread")]
    /// async fn main() -> Result<(), subpub::BusError> {
    ///     let bus: Bus<String> = Bus::new(Config::default());
    ///     let mut stream = bus.subscribe_stream("ticks", 16)?;
    ///
    ///     bus.publish("ticks", "t1".to_string()).await?;
    ///     assert_eq!(stream.next().await.as_deref(), Some("t1"));
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe_stream(
        &self,
        subject: &str,
        buffer: usize,
    ) -> Result<SubjectStream<M>, BusError> {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let sink = StreamSink {
            subject: Arc::from(subject),
            tx,
        };
        let subscription = self.subscribe(subject, Arc::new(sink))?;

        Ok(SubjectStream {
            inner: ReceiverStream::new(rx),
            subscription,
        })
    }
}
