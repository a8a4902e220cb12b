//! Event keys, listeners and meta events.
//!
//! This module groups the **data model** shared by the registry, the dispatch
//! engine and the iteration bridge.
//!
//! ## Contents
//! - [`EventKey`], [`Symbol`], [`EventKeys`] event identifiers
//! - [`Listener`], [`AnyListener`] identity-carrying callables, plus the
//!   [`Handler`]/[`AnyHandler`] trait-object forms
//! - [`MetaEvent`], [`ListenerChange`] listener-added/removed announcements

mod key;
mod listener;
mod meta;

pub use key::{EventKey, EventKeys, Symbol};
pub use listener::{AnyHandler, AnyListener, Handler, Listener, ListenerFuture, ListenerId};
pub use meta::{ListenerChange, MetaEvent};
