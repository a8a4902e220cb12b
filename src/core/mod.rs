//! Emitter core: registry, dispatch and the public facade.
//!
//! The public API from this module is [`Emitter`] and the handles it returns.
//!
//! Internal modules:
//! - [`registry`]: listener sets, iterator producers and meta listeners;
//! - [`dispatch`]: concurrent/serial fan-out of one emission;
//! - [`emitter`]: validation, snapshots, subscriptions and housekeeping;
//! - [`builder`]: configuration-driven construction;
//! - [`config`]: emitter and debug settings.

mod builder;
mod config;
mod dispatch;
mod emitter;
mod registry;

pub use builder::EmitterBuilder;
pub use config::{Config, DebugConfig};
pub use dispatch::Emission;
pub use emitter::{Emitter, Once, Unsubscribe};
