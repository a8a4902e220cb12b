//! # EventStream: pull-based view over pushed events.
//!
//! An [`EventStream`] is created by [`Emitter::events`](crate::Emitter::events) or
//! [`Emitter::any_event`](crate::Emitter::any_event). Its producer is registered at
//! creation, so events emitted before the first [`next`](EventStream::next) are buffered.
//!
//! ## Rules
//! - `next` returns queued items without suspending; parks on an empty open queue;
//!   returns `None` once the sequence has ended.
//! - `close` unregisters the producer, discards unread items and wakes a parked `next`.
//!   It is idempotent and also runs on drop, including after the sequence already ended.
//! - `clear` on the emitter finishes the producer: buffered items stay readable.
//!
//! ## Example
//! ```rust
//! use asyncemit::Emitter;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), asyncemit::Error> {
//! let emitter: Emitter<&'static str> = Emitter::new();
//! let mut events = emitter.events("x")?;
//!
//! emitter.emit("x", "a")?.await?;
//! emitter.emit("x", "b")?.await?;
//!
//! assert_eq!(events.next().await, Some("a"));
//! assert_eq!(events.next().await, Some("b"));
//!
//! events.close();
//! assert_eq!(events.next().await, None);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use futures::stream::{self, Stream};

use super::producer::{Phase, Producer};
use crate::events::EventKey;

type Detach = Box<dyn Fn() + Send + Sync>;

/// Asynchronous iterator over event payloads.
pub struct EventStream<I> {
    producer: Arc<Producer<I>>,
    detach: Detach,
    detached: AtomicBool,
}

/// Iterator over payloads of selected event keys.
pub type Events<T> = EventStream<T>;

/// Iterator over `(key, payload)` pairs of every event.
pub type AnyEvents<T> = EventStream<(EventKey, T)>;

impl<I: Send + 'static> EventStream<I> {
    /// `detach` must remove `producer` from every registry set it was added to.
    pub(crate) fn new(producer: Arc<Producer<I>>, detach: Detach) -> Self {
        Self {
            producer,
            detach,
            detached: AtomicBool::new(false),
        }
    }

    /// Pulls the next item; `None` marks end-of-sequence.
    pub async fn next(&mut self) -> Option<I> {
        self.producer.pull().await
    }

    /// Terminates the iterator early.
    ///
    /// Safe to call any number of times; only the first call has an effect.
    pub fn close(&self) {
        self.producer.close();
        self.unregister();
    }

    /// Terminates the iterator and hands back the awaited `value`.
    pub async fn close_with<F: Future>(&self, value: F) -> F::Output {
        self.close();
        value.await
    }

    /// Returns `true` once `next` can only return `None`.
    pub fn is_ended(&self) -> bool {
        self.producer.phase() == Phase::Ended
    }

    /// Adapts the iterator into a [`Stream`]; dropping the stream closes it.
    pub fn into_stream(self) -> impl Stream<Item = I> + Send {
        stream::unfold(self, |mut it| async move {
            let item = it.next().await?;
            Some((item, it))
        })
    }
}

impl<I> EventStream<I> {
    /// Removes the producer from the registry once, however the sequence ended.
    ///
    /// A producer finished by `clear` on one key may still be attached to the other
    /// keys it was created for.
    fn unregister(&self) {
        if !self.detached.swap(true, AtomicOrdering::AcqRel) {
            (self.detach)();
        }
    }
}

impl<I> Drop for EventStream<I> {
    fn drop(&mut self) {
        self.producer.close();
        self.unregister();
    }
}

impl<I> fmt::Debug for EventStream<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("producer", &self.producer.id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn counted(detaches: &Arc<AtomicUsize>) -> (Arc<Producer<u32>>, EventStream<u32>) {
        let producer = Arc::new(Producer::new());
        let detaches = Arc::clone(detaches);
        let stream = EventStream::new(
            Arc::clone(&producer),
            Box::new(move || {
                detaches.fetch_add(1, AtomicOrdering::SeqCst);
            }),
        );
        (producer, stream)
    }

    #[tokio::test]
    async fn test_drop_after_drain_still_detaches() {
        let detaches = Arc::new(AtomicUsize::new(0));
        let (producer, mut stream) = counted(&detaches);

        producer.enqueue(1);
        producer.finish();
        assert_eq!(stream.next().await, Some(1));
        assert_eq!(stream.next().await, None);
        assert!(stream.is_ended());

        drop(stream);
        assert_eq!(detaches.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_close_detaches_once() {
        let detaches = Arc::new(AtomicUsize::new(0));
        let (_producer, stream) = counted(&detaches);

        stream.close();
        stream.close();
        drop(stream);
        assert_eq!(detaches.load(AtomicOrdering::SeqCst), 1);
    }
}
