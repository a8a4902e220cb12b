//! # Listeners: identity-carrying callables.
//!
//! [`Listener`] wraps a closure `F: Fn(T) -> Fut`, producing a fresh future per
//! invocation. [`AnyListener`] is the two-argument shape `Fn(EventKey, T) -> Fut`
//! invoked for every event.
//!
//! ## Identity
//! Every listener carries a [`ListenerId`] allocated at construction. Clones share the
//! id; two listeners built from the same closure do not. The registry deduplicates by id,
//! so re-registering a clone is a no-op.
//!
//! ## Panic isolation
//! [`Listener::call`] catches panics (both in the closure and in the future it returns)
//! and reports them as [`ListenerError::Panicked`].
//!
//! ## Example
//! ```rust
//! use asyncemit::{Listener, ListenerError};
//!
//! let l: Listener<u32> = Listener::new(|n: u32| async move {
//!     if n == 0 {
//!         return Err(ListenerError::fail("zero"));
//!     }
//!     Ok(())
//! });
//!
//! let same = l.clone();
//! assert_eq!(l.id(), same.id());
//! ```

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::ListenerError;
use crate::events::EventKey;

static LISTENER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Future returned by a listener invocation.
pub type ListenerFuture = BoxFuture<'static, Result<(), ListenerError>>;

type ListenerFn<T> = dyn Fn(T) -> ListenerFuture + Send + Sync;
type AnyListenerFn<T> = dyn Fn(EventKey, T) -> ListenerFuture + Send + Sync;

/// Stable identity of a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        ListenerId(LISTENER_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Returns the raw id value (for logs).
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// # Trait-object listener for a single event key.
///
/// Useful when the listener carries state and a name, e.g. a metrics sink.
/// Turn it into a [`Listener`] with [`Listener::from_handler`].
#[async_trait]
pub trait Handler<T>: Send + Sync + 'static {
    /// Handles one event payload.
    async fn handle(&self, data: T) -> Result<(), ListenerError>;

    /// Returns the handler name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// # Trait-object listener for every event.
#[async_trait]
pub trait AnyHandler<T>: Send + Sync + 'static {
    /// Handles one event together with its key.
    async fn handle(&self, event: EventKey, data: T) -> Result<(), ListenerError>;

    /// Returns the handler name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Callable registered against specific event keys.
pub struct Listener<T> {
    id: ListenerId,
    name: &'static str,
    f: Arc<ListenerFn<T>>,
}

impl<T: Send + 'static> Listener<T> {
    /// Creates a listener from a closure returning a future.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ListenerError>> + Send + 'static,
    {
        Self::with_id(ListenerId::next(), f)
    }

    /// Creates a listener that delegates to a [`Handler`].
    pub fn from_handler<H: Handler<T>>(handler: Arc<H>) -> Self {
        let name = handler.name();
        let mut listener = Self::new(move |data: T| {
            let h = Arc::clone(&handler);
            async move { h.handle(data).await }
        });
        listener.name = name;
        listener
    }

    pub(crate) fn with_id<F, Fut>(id: ListenerId, f: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ListenerError>> + Send + 'static,
    {
        Self {
            id,
            name: "listener",
            f: Arc::new(move |data| f(data).boxed()),
        }
    }

    /// Invokes the listener, converting panics into [`ListenerError::Panicked`].
    pub(crate) async fn call(&self, data: T) -> Result<(), ListenerError> {
        let f = Arc::clone(&self.f);
        let invocation = async move { f(data).await };
        match AssertUnwindSafe(invocation).catch_unwind().await {
            Ok(res) => res,
            Err(panic) => Err(ListenerError::Panicked {
                info: panic_message(panic),
            }),
        }
    }
}

impl<T> Listener<T> {
    /// Returns the listener identity.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Returns the name used in logs (`"listener"` for closures).
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name,
            f: Arc::clone(&self.f),
        }
    }
}

impl<T> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// Callable invoked for every emitted event, with the event key.
pub struct AnyListener<T> {
    id: ListenerId,
    name: &'static str,
    f: Arc<AnyListenerFn<T>>,
}

impl<T: Send + 'static> AnyListener<T> {
    /// Creates an any-listener from a closure returning a future.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(EventKey, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ListenerError>> + Send + 'static,
    {
        Self {
            id: ListenerId::next(),
            name: "any_listener",
            f: Arc::new(move |event, data| f(event, data).boxed()),
        }
    }

    /// Creates an any-listener that delegates to an [`AnyHandler`].
    pub fn from_handler<H: AnyHandler<T>>(handler: Arc<H>) -> Self {
        let name = handler.name();
        let mut listener = Self::new(move |event: EventKey, data: T| {
            let h = Arc::clone(&handler);
            async move { h.handle(event, data).await }
        });
        listener.name = name;
        listener
    }

    pub(crate) async fn call(&self, event: EventKey, data: T) -> Result<(), ListenerError> {
        let f = Arc::clone(&self.f);
        let invocation = async move { f(event, data).await };
        match AssertUnwindSafe(invocation).catch_unwind().await {
            Ok(res) => res,
            Err(panic) => Err(ListenerError::Panicked {
                info: panic_message(panic),
            }),
        }
    }
}

impl<T> AnyListener<T> {
    /// Returns the listener identity.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Returns the name used in logs (`"any_listener"` for closures).
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for AnyListener<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name,
            f: Arc::clone(&self.f),
        }
    }
}

impl<T> fmt::Debug for AnyListener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyListener")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
