//! # Emits: give a host type the emitter surface by composition.
//!
//! A host type owns an [`Emitter`] and implements [`Emits::emitter`]; every other
//! method has a default that delegates to it.
//!
//! ## Example
//! ```rust
//! use asyncemit::{Emits, Emitter, Listener};
//!
//! struct Clock {
//!     events: Emitter<u64>,
//! }
//!
//! impl Emits<u64> for Clock {
//!     fn emitter(&self) -> &Emitter<u64> {
//!         &self.events
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), asyncemit::Error> {
//! let clock = Clock { events: Emitter::new() };
//! let mut ticks = clock.events("tick")?;
//!
//! clock.emit("tick", 1)?.await?;
//! assert_eq!(ticks.next().await, Some(1));
//! # Ok(())
//! # }
//! ```

use crate::core::{Emission, Emitter, Once, Unsubscribe};
use crate::error::Error;
use crate::events::{AnyListener, EventKey, EventKeys, Listener, ListenerChange, MetaEvent};
use crate::iter::{AnyEvents, Events};

/// Delegating access to an owned [`Emitter`].
pub trait Emits<T: Clone + Send + 'static> {
    /// Returns the owned emitter.
    fn emitter(&self) -> &Emitter<T>;

    /// See [`Emitter::on`].
    fn on(&self, keys: impl Into<EventKeys>, listener: Listener<T>) -> Result<Unsubscribe, Error> {
        self.emitter().on(keys, listener)
    }

    /// See [`Emitter::off`].
    fn off(&self, keys: impl Into<EventKeys>, listener: &Listener<T>) -> Result<(), Error> {
        self.emitter().off(keys, listener)
    }

    /// See [`Emitter::off_all`].
    fn off_all(&self, keys: impl Into<EventKeys>) -> Result<(), Error> {
        self.emitter().off_all(keys)
    }

    /// See [`Emitter::once`].
    fn once(&self, keys: impl Into<EventKeys>) -> Result<Once<T>, Error> {
        self.emitter().once(keys)
    }

    /// See [`Emitter::events`].
    fn events(&self, keys: impl Into<EventKeys>) -> Result<Events<T>, Error> {
        self.emitter().events(keys)
    }

    /// See [`Emitter::emit`].
    fn emit(&self, key: impl Into<EventKey>, data: T) -> Result<Emission, Error> {
        self.emitter().emit(key, data)
    }

    /// See [`Emitter::emit_serial`].
    fn emit_serial(&self, key: impl Into<EventKey>, data: T) -> Result<Emission, Error> {
        self.emitter().emit_serial(key, data)
    }

    /// See [`Emitter::on_any`].
    fn on_any(&self, listener: AnyListener<T>) -> Unsubscribe {
        self.emitter().on_any(listener)
    }

    /// See [`Emitter::off_any`].
    fn off_any(&self, listener: &AnyListener<T>) {
        self.emitter().off_any(listener)
    }

    /// See [`Emitter::off_any_all`].
    fn off_any_all(&self) {
        self.emitter().off_any_all()
    }

    /// See [`Emitter::any_event`].
    fn any_event(&self) -> AnyEvents<T> {
        self.emitter().any_event()
    }

    /// See [`Emitter::on_meta`].
    fn on_meta(&self, kind: MetaEvent, listener: Listener<ListenerChange>) -> Unsubscribe {
        self.emitter().on_meta(kind, listener)
    }

    /// See [`Emitter::off_meta`].
    fn off_meta(&self, kind: MetaEvent, listener: &Listener<ListenerChange>) {
        self.emitter().off_meta(kind, listener)
    }

    /// See [`Emitter::clear`].
    fn clear(&self, keys: impl Into<EventKeys>) -> Result<(), Error> {
        self.emitter().clear(keys)
    }

    /// See [`Emitter::clear_all`].
    fn clear_all(&self) {
        self.emitter().clear_all()
    }

    /// See [`Emitter::count`].
    fn count(&self, keys: impl Into<EventKeys>) -> Result<usize, Error> {
        self.emitter().count(keys)
    }

    /// See [`Emitter::count_all`].
    fn count_all(&self) -> usize {
        self.emitter().count_all()
    }
}
