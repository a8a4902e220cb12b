//! # Emitter: subscription registry, dispatch and iteration behind one handle.
//!
//! The [`Emitter`] owns its registry exclusively (no global state). Cloning an emitter
//! yields another handle to the **same** registry.
//!
//! ## High-level architecture
//! ```text
//! on / off / on_any / off_any / on_meta ─► Registry (lock, sync)
//!                                            ├─► DebugRecord ─► logger        (sync)
//!                                            └─► MetaEvent ─► meta queue ─► worker (async)
//!
//! emit(key, data) ─► validate ─► Registry.enqueue(producers)
//!                             └─► Registry.snapshot(key) ─► Emission (dispatch.rs)
//!
//! events(keys) / any_event() ─► Producer attached to Registry ─► EventStream
//! once(keys) ─► one-shot Listener ─► oneshot channel ─► Once
//! ```
//!
//! ## Rules
//! - The registry lock is never held across an await, never while calling the debug
//!   logger, and never while dropping removed listeners.
//! - Validation errors are returned synchronously; listener failures only through the
//!   [`Emission`] future.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use asyncemit::{Emitter, Listener};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), asyncemit::Error> {
//! let emitter: Emitter<u32> = Emitter::new();
//! let total = Arc::new(AtomicUsize::new(0));
//!
//! let sum = {
//!     let total = Arc::clone(&total);
//!     Listener::new(move |n: u32| {
//!         total.fetch_add(n as usize, Ordering::SeqCst);
//!         async { Ok(()) }
//!     })
//! };
//!
//! let off = emitter.on("add", sum)?;
//! emitter.emit("add", 2)?.await?;
//! emitter.emit("add", 3)?.await?;
//! off.unsubscribe();
//! emitter.emit("add", 100)?.await?;
//!
//! assert_eq!(total.load(Ordering::SeqCst), 5);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use super::builder::EmitterBuilder;
use super::config::{Config, DebugConfig};
use super::dispatch::{self, Emission, Mode};
use super::registry::Registry;
use crate::debug::{self, DebugKind, DebugRecord};
use crate::error::Error;
use crate::events::{
    AnyListener, EventKey, EventKeys, Listener, ListenerChange, ListenerId, MetaEvent,
};
use crate::iter::{AnyEvents, EventStream, Events, Producer};

/// Meta emission waiting for the emitter's meta worker.
type MetaJob = (MetaEvent, Emission);

/// State shared by every handle to one emitter.
pub(crate) struct Shared<T> {
    pub(crate) registry: Mutex<Registry<T>>,
    debug: DebugConfig,
    meta_queue: Mutex<Option<mpsc::UnboundedSender<MetaJob>>>,
}

/// Runs queued meta emissions one after another until the emitter is dropped.
async fn meta_worker(mut rx: mpsc::UnboundedReceiver<MetaJob>) {
    while let Some((kind, emission)) = rx.recv().await {
        if let Err(err) = emission.await {
            tracing::warn!(meta = kind.as_label(), error = %err, "meta listener failed");
        }
    }
}

impl<T: Clone + Send + 'static> Shared<T> {
    fn report(&self, kind: DebugKind, event: Option<&EventKey>, listener: Option<ListenerId>) {
        if let Some(logger) = self.debug.active_logger() {
            debug::report(
                &logger,
                &DebugRecord {
                    kind,
                    emitter: &self.debug.name,
                    event,
                    listener,
                },
            );
        }
    }

    /// Announces a listener change to meta listeners, if any are registered.
    ///
    /// Announcements go through one queue per emitter, so they are delivered in the
    /// order the changes happened.
    fn announce(self: &Arc<Self>, kind: MetaEvent, change: ListenerChange) {
        let listeners = self.registry.lock().meta_snapshot(kind);
        if listeners.is_empty() {
            return;
        }
        let emission = dispatch::meta_emission(self, kind, change, listeners);

        let mut queue = self.meta_queue.lock();
        let job = match queue.as_ref() {
            Some(tx) => match tx.send((kind, emission)) {
                Ok(()) => return,
                // Worker gone with its runtime; start a new one below.
                Err(mpsc::error::SendError(job)) => job,
            },
            None => (kind, emission),
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::trace!(meta = kind.as_label(), "no tokio runtime; meta event skipped");
            *queue = None;
            return;
        };
        let (tx, rx) = mpsc::unbounded_channel();
        runtime.spawn(meta_worker(rx));
        if tx.send(job).is_ok() {
            *queue = Some(tx);
        }
    }

    fn add(self: &Arc<Self>, key: &EventKey, listener: &Listener<T>) {
        let added = self.registry.lock().insert(key, listener);
        if added {
            self.report(DebugKind::Subscribe, Some(key), Some(listener.id()));
            tracing::debug!(event = ?key, listener = %listener.id(), "listener added");
            self.announce(
                MetaEvent::ListenerAdded,
                ListenerChange {
                    listener: listener.id(),
                    event: Some(key.clone()),
                },
            );
        }
    }

    fn remove(self: &Arc<Self>, key: &EventKey, id: ListenerId) {
        let removed = self.registry.lock().remove(key, id);
        if removed.is_some() {
            self.report(DebugKind::Unsubscribe, Some(key), Some(id));
            tracing::debug!(event = ?key, listener = %id, "listener removed");
            self.announce(
                MetaEvent::ListenerRemoved,
                ListenerChange {
                    listener: id,
                    event: Some(key.clone()),
                },
            );
        }
    }

    fn remove_all(self: &Arc<Self>, key: &EventKey) {
        let removed = self.registry.lock().remove_all(key);
        self.report(DebugKind::Unsubscribe, Some(key), None);
        self.announce_removed(removed.iter().map(|l| (Some(key.clone()), l.id())));
    }

    fn add_any(self: &Arc<Self>, listener: &AnyListener<T>) {
        let added = self.registry.lock().insert_any(listener);
        if added {
            self.report(DebugKind::Subscribe, None, Some(listener.id()));
            tracing::debug!(listener = %listener.id(), "any-listener added");
            self.announce(
                MetaEvent::ListenerAdded,
                ListenerChange {
                    listener: listener.id(),
                    event: None,
                },
            );
        }
    }

    fn remove_any(self: &Arc<Self>, id: ListenerId) {
        let removed = self.registry.lock().remove_any(id);
        if removed.is_some() {
            self.report(DebugKind::Unsubscribe, None, Some(id));
            tracing::debug!(listener = %id, "any-listener removed");
            self.announce_removed(std::iter::once((None, id)));
        }
    }

    fn remove_all_any(self: &Arc<Self>) {
        let removed = self.registry.lock().remove_all_any();
        self.report(DebugKind::Unsubscribe, None, None);
        self.announce_removed(removed.iter().map(|l| (None, l.id())));
    }

    fn add_meta(&self, kind: MetaEvent, listener: &Listener<ListenerChange>) {
        if self.registry.lock().insert_meta(kind, listener) {
            self.report(DebugKind::Subscribe, Some(&kind.key()), Some(listener.id()));
        }
    }

    fn remove_meta(&self, kind: MetaEvent, id: ListenerId) {
        let removed = self.registry.lock().remove_meta(kind, id);
        if removed.is_some() {
            self.report(DebugKind::Unsubscribe, Some(&kind.key()), Some(id));
        }
    }

    fn announce_removed(self: &Arc<Self>, removed: impl IntoIterator<Item = (Option<EventKey>, ListenerId)>) {
        for (event, listener) in removed {
            self.announce(MetaEvent::ListenerRemoved, ListenerChange { listener, event });
        }
    }
}

/// Idempotent handle that removes a subscription.
///
/// Dropping the handle does **not** unsubscribe.
#[derive(Clone)]
pub struct Unsubscribe {
    detach: Arc<dyn Fn() + Send + Sync>,
}

impl Unsubscribe {
    fn new(detach: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            detach: Arc::new(detach),
        }
    }

    /// Removes the subscription; further calls have no additional effect.
    pub fn unsubscribe(&self) {
        (self.detach)();
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe").finish_non_exhaustive()
    }
}

/// Pending first occurrence of an event, from [`Emitter::once`].
///
/// Resolves to `Some(payload)` for the first matching event, or `None` if the one-shot
/// subscription was removed (`clear`, `off_all`) before any event arrived.
/// [`Once::off`] or dropping the future detaches it without resolving.
#[must_use = "a once subscription detaches when dropped"]
pub struct Once<T> {
    rx: oneshot::Receiver<T>,
    off: Unsubscribe,
}

impl<T> Once<T> {
    /// Cancels the wait; the subscription is removed and nothing is delivered.
    pub fn off(self) {
        drop(self);
    }
}

impl<T> Future for Once<T> {
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}

impl<T> Drop for Once<T> {
    fn drop(&mut self) {
        self.off.unsubscribe();
    }
}

impl<T> fmt::Debug for Once<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Once").finish_non_exhaustive()
    }
}

/// Asynchronous event emitter for payloads of type `T`.
pub struct Emitter<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Send + 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("name", &self.shared.debug.name)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + 'static> Emitter<T> {
    /// Creates an emitter with the default [`Config`].
    ///
    /// The debug hook still activates when [`DEBUG_ENV`](crate::DEBUG_ENV) names
    /// `"emitter"` or is `*`.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an emitter with the given configuration.
    pub fn with_config(cfg: Config) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(Registry::new()),
                debug: cfg.debug,
                meta_queue: Mutex::new(None),
            }),
        }
    }

    /// Returns a builder for an emitter.
    pub fn builder() -> EmitterBuilder<T> {
        EmitterBuilder::new(Config::default())
    }

    /// Returns the emitter's debug name.
    pub fn name(&self) -> &str {
        &self.shared.debug.name
    }

    // ---------------------------
    // Subscriptions
    // ---------------------------

    /// Subscribes `listener` to every key in `keys`.
    ///
    /// Re-subscribing the same listener (same identity) to a key is a no-op.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] for an empty key list or a reserved key.
    pub fn on(
        &self,
        keys: impl Into<EventKeys>,
        listener: Listener<T>,
    ) -> Result<Unsubscribe, Error> {
        let keys = subscription_keys(keys.into(), "on")?;
        for key in &keys {
            self.shared.add(key, &listener);
        }

        let weak = Arc::downgrade(&self.shared);
        let id = listener.id();
        drop(listener);
        Ok(Unsubscribe::new(move || {
            if let Some(shared) = weak.upgrade() {
                for key in &keys {
                    shared.remove(key, id);
                }
            }
        }))
    }

    /// Removes `listener` from every key in `keys`.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] for an empty key list or a reserved key.
    pub fn off(&self, keys: impl Into<EventKeys>, listener: &Listener<T>) -> Result<(), Error> {
        for key in subscription_keys(keys.into(), "off")? {
            self.shared.remove(&key, listener.id());
        }
        Ok(())
    }

    /// Removes every listener of every key in `keys`.
    ///
    /// Iterators on those keys are not affected; use [`Emitter::clear`] for that.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] for an empty key list or a reserved key.
    pub fn off_all(&self, keys: impl Into<EventKeys>) -> Result<(), Error> {
        for key in subscription_keys(keys.into(), "off_all")? {
            self.shared.remove_all(&key);
        }
        Ok(())
    }

    /// Waits for the first event on any of `keys`.
    ///
    /// The one-shot listener removes itself from every key before delivering.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] for an empty key list or a reserved key.
    pub fn once(&self, keys: impl Into<EventKeys>) -> Result<Once<T>, Error> {
        let keys = subscription_keys(keys.into(), "once")?;
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Mutex::new(Some(tx)));
        let id = ListenerId::next();

        let listener = {
            let weak: Weak<Shared<T>> = Arc::downgrade(&self.shared);
            let keys = keys.clone();
            Listener::with_id(id, move |data: T| {
                if let Some(shared) = weak.upgrade() {
                    for key in &keys {
                        shared.remove(key, id);
                    }
                }
                if let Some(tx) = slot.lock().take() {
                    let _ = tx.send(data);
                }
                futures::future::ready(Ok(()))
            })
        };

        let off = self.on(keys, listener)?;
        Ok(Once { rx, off })
    }

    /// Subscribes `listener` to every event.
    pub fn on_any(&self, listener: AnyListener<T>) -> Unsubscribe {
        self.shared.add_any(&listener);

        let weak = Arc::downgrade(&self.shared);
        let id = listener.id();
        drop(listener);
        Unsubscribe::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.remove_any(id);
            }
        })
    }

    /// Removes one any-listener.
    pub fn off_any(&self, listener: &AnyListener<T>) {
        self.shared.remove_any(listener.id());
    }

    /// Removes every any-listener.
    pub fn off_any_all(&self) {
        self.shared.remove_all_any();
    }

    /// Subscribes a meta listener to listener additions or removals.
    ///
    /// Meta listeners are not counted and their own (un)registration is never announced.
    pub fn on_meta(&self, kind: MetaEvent, listener: Listener<ListenerChange>) -> Unsubscribe {
        self.shared.add_meta(kind, &listener);

        let weak = Arc::downgrade(&self.shared);
        let id = listener.id();
        drop(listener);
        Unsubscribe::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.remove_meta(kind, id);
            }
        })
    }

    /// Removes one meta listener.
    pub fn off_meta(&self, kind: MetaEvent, listener: &Listener<ListenerChange>) {
        self.shared.remove_meta(kind, listener.id());
    }

    // ---------------------------
    // Dispatch
    // ---------------------------

    /// Emits `data` on `key`, invoking every recipient concurrently.
    ///
    /// Producers are fed and recipients are frozen **now**; the returned [`Emission`]
    /// yields once and then runs the listeners. It fails with the first failure in
    /// snapshot order after every listener has settled.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `key` is reserved for meta events.
    pub fn emit(&self, key: impl Into<EventKey>, data: T) -> Result<Emission, Error> {
        self.prepare(key.into(), data, Mode::Concurrent)
    }

    /// Emits `data` on `key`, invoking recipients one at a time.
    ///
    /// Named listeners run first, then any-listeners, each in registration order. The
    /// first failure stops the emission.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `key` is reserved for meta events.
    pub fn emit_serial(&self, key: impl Into<EventKey>, data: T) -> Result<Emission, Error> {
        self.prepare(key.into(), data, Mode::Serial)
    }

    fn prepare(&self, key: EventKey, data: T, mode: Mode) -> Result<Emission, Error> {
        if key.is_reserved() {
            return Err(Error::invalid(format!(
                "{key:?} is a meta event and cannot be emitted directly"
            )));
        }

        let kind = match mode {
            Mode::Concurrent => DebugKind::Emit,
            Mode::Serial => DebugKind::EmitSerial,
        };
        self.shared.report(kind, Some(&key), None);

        let snapshot = {
            let reg = self.shared.registry.lock();
            reg.enqueue(&key, &data);
            reg.snapshot(&key)
        };
        Ok(dispatch::emission(&self.shared, key, data, snapshot, mode))
    }

    // ---------------------------
    // Iteration
    // ---------------------------

    /// Returns an iterator over payloads emitted on any of `keys` from now on.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] for an empty key list or a reserved key.
    pub fn events(&self, keys: impl Into<EventKeys>) -> Result<Events<T>, Error> {
        let keys = subscription_keys(keys.into(), "events")?;
        let producer = Arc::new(Producer::new());
        {
            let mut reg = self.shared.registry.lock();
            for key in &keys {
                reg.attach_producer(key, Arc::clone(&producer));
            }
        }

        let weak = Arc::downgrade(&self.shared);
        let id = producer.id();
        Ok(EventStream::new(
            producer,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    let mut reg = shared.registry.lock();
                    for key in &keys {
                        reg.detach_producer(key, id);
                    }
                }
            }),
        ))
    }

    /// Returns an iterator over `(key, payload)` for every event emitted from now on.
    pub fn any_event(&self) -> AnyEvents<T> {
        let producer = Arc::new(Producer::new());
        self.shared
            .registry
            .lock()
            .attach_any_producer(Arc::clone(&producer));

        let weak = Arc::downgrade(&self.shared);
        let id = producer.id();
        EventStream::new(
            producer,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.registry.lock().detach_any_producer(id);
                }
            }),
        )
    }

    // ---------------------------
    // Housekeeping
    // ---------------------------

    /// Removes the listeners of `keys` and finishes their iterators.
    ///
    /// Buffered iterator items stay readable; afterwards the iterators end.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] for an empty key list.
    pub fn clear(&self, keys: impl Into<EventKeys>) -> Result<(), Error> {
        for key in non_empty(keys.into(), "clear")? {
            let removed = self.shared.registry.lock().clear(&key);
            self.shared.report(DebugKind::Clear, Some(&key), None);
            self.shared
                .announce_removed(removed.iter().map(|l| (Some(key.clone()), l.id())));
        }
        Ok(())
    }

    /// Removes every listener and any-listener and finishes every iterator.
    pub fn clear_all(&self) {
        let cleared = self.shared.registry.lock().clear_all();
        self.shared.report(DebugKind::Clear, None, None);
        self.shared.announce_removed(
            cleared
                .listeners
                .iter()
                .map(|(key, l)| (Some(key.clone()), l.id()))
                .chain(cleared.any.iter().map(|l| (None, l.id()))),
        );
    }

    /// Counts listeners for `keys`, including any-listeners and open iterators.
    ///
    /// Each listed key contributes its own listeners and iterators plus the
    /// any-listeners and any-iterators.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] for an empty key list.
    pub fn count(&self, keys: impl Into<EventKeys>) -> Result<usize, Error> {
        let keys = non_empty(keys.into(), "count")?;
        let reg = self.shared.registry.lock();
        Ok(keys.iter().map(|key| reg.count(key)).sum())
    }

    /// Counts every listener, any-listener and open iterator.
    pub fn count_all(&self) -> usize {
        self.shared.registry.lock().count_all()
    }
}

fn non_empty(keys: EventKeys, op: &str) -> Result<Vec<EventKey>, Error> {
    if keys.is_empty() {
        return Err(Error::invalid(format!("{op}: at least one event key is required")));
    }
    Ok(keys.into_vec())
}

fn subscription_keys(keys: EventKeys, op: &str) -> Result<Vec<EventKey>, Error> {
    let keys = non_empty(keys, op)?;
    if let Some(key) = keys.iter().find(|k| k.is_reserved()) {
        return Err(Error::invalid(format!(
            "{op}: {key:?} is a meta event; use on_meta"
        )));
    }
    Ok(keys)
}
