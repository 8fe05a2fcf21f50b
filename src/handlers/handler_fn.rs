//! # Function-backed handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(M) -> Fut`, producing a fresh future per
//! delivery. The message is cloned out of the shared delivery, so the closure owns
//! its argument and may move it into the returned future.
//!
//! ## Example
//! ```rust
//! use subpub::{Handler, HandlerFn, HandlerRef};
//!
//! let h: HandlerRef<String> = HandlerFn::arc("printer", |msg: String| async move {
//!     println!("got {msg}");
//! });
//!
//! assert_eq!(h.name(), "printer");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::handlers::Handler;

/// Function-backed handler implementation.
#[derive(Debug)]
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`](crate::HandlerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<M, F, Fut> Handler<M> for HandlerFn<F>
where
    M: Clone + Send + Sync + 'static,
    F: Fn(M) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn deliver(&self, msg: &M) {
        (self.f)(msg.clone()).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn closure_receives_owned_message() {
        let seen = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&seen);
        let h = HandlerFn::new("len", move |msg: String| {
            let s = Arc::clone(&s);
            async move {
                s.fetch_add(msg.len(), Ordering::SeqCst);
            }
        });

        h.deliver(&"hello".to_string()).await;
        h.deliver(&"hi".to_string()).await;

        assert_eq!(seen.load(Ordering::SeqCst), 7);
        assert_eq!(Handler::<String>::name(&h), "len");
    }
}
