//! # asyncemit
//!
//! **asyncemit** is an asynchronous, in-process event emitter for Rust.
//!
//! Subscribers register interest in named (or symbol-keyed) events; publishers emit
//! events with a payload; the emitter fans each event out to every interested
//! subscriber and reports when their (possibly asynchronous) handling has completed.
//! Events can also be consumed as a pull-based sequence.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   publisher                         subscribers
//!      │                                  ▲   ▲
//!      │ emit(key, data)                  │   │ listener(data) / any(key, data)
//!      ▼                                  │   │
//! ┌───────────────────────────────────────┴───┴───────────────────────┐
//! │  Emitter                                                          │
//! │  - Registry (listener sets, any-listeners, producers, meta)       │
//! │  - Dispatch (snapshot ─► yield ─► concurrent | serial)            │
//! │  - Iteration bridge (Producer queue ─► EventStream::next)         │
//! └──────┬────────────────────────────────────────────────────┬──────┘
//!        ▼                                                     ▼
//!   EventStream::next()                               MetaEvent listeners
//!   (buffered, FIFO)                             (listener added / removed)
//! ```
//!
//! ### Emission
//! ```text
//! emit(key, data)
//!   ├─► validate key                      (sync, Err(InvalidArgument))
//!   ├─► enqueue into producers            (sync)
//!   ├─► snapshot listeners + any          (sync)
//!   └─► Emission future
//!          ├─► yield (scheduling boundary)
//!          ├─► skip listeners removed since the snapshot
//!          └─► first failure in snapshot order ─► Err(Error::Listener)
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                       |
//! |-------------------|----------------------------------------------------------------|------------------------------------------|
//! | **Subscriptions** | Identity-deduplicated listeners per key and for all events.    | [`Listener`], [`AnyListener`], [`Handler`] |
//! | **Dispatch**      | Concurrent (`emit`) and sequential (`emit_serial`) fan-out.     | [`Emitter`], [`Emission`]                |
//! | **Iteration**     | Buffered pull-based sequences of events.                       | [`EventStream`], [`Events`], [`AnyEvents`] |
//! | **One-shot**      | Await the next occurrence of an event.                         | [`Once`]                                 |
//! | **Meta events**   | Observe listener additions and removals.                       | [`MetaEvent`], [`ListenerChange`]        |
//! | **Errors**        | Typed errors for validation and listener failures.             | [`Error`], [`ListenerError`]             |
//! | **Configuration** | Debug hook, builder, composition.                              | [`Config`], [`EmitterBuilder`], [`Emits`] |
//!
//! ## Example
//! ```rust
//! use asyncemit::{AnyListener, Emitter, Listener};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), asyncemit::Error> {
//!     let emitter: Emitter<String> = Emitter::new();
//!
//!     emitter.on("greet", Listener::new(|name: String| async move {
//!         println!("hello, {name}");
//!         Ok(())
//!     }))?;
//!     emitter.on_any(AnyListener::new(|key, name: String| async move {
//!         println!("{key}: {name}");
//!         Ok(())
//!     }));
//!
//!     let mut greetings = emitter.events("greet")?;
//!     emitter.emit("greet", "world".to_string())?.await?;
//!
//!     assert_eq!(greetings.next().await.as_deref(), Some("world"));
//!     Ok(())
//! }
//! ```

mod core;
mod debug;
mod error;
mod events;
mod host;
mod iter;

// ---- Public re-exports ----

pub use crate::core::{Config, DebugConfig, Emission, Emitter, EmitterBuilder, Once, Unsubscribe};
pub use debug::{
    is_debug_enabled, set_debug_enabled, DebugKind, DebugLogger, DebugRecord, DebugWriter,
    DEBUG_ENV,
};
pub use error::{Error, ListenerError};
pub use events::{
    AnyHandler, AnyListener, EventKey, EventKeys, Handler, Listener, ListenerChange,
    ListenerFuture, ListenerId, MetaEvent, Symbol,
};
pub use host::Emits;
pub use iter::{AnyEvents, EventStream, Events};
