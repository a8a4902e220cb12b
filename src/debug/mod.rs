//! # Debug hook for emitter operations.
//!
//! When debugging is active for an emitter, every subscribe, unsubscribe, emit,
//! emit_serial and clear call hands a [`DebugRecord`] to the configured logger
//! **synchronously**, before the operation's own effects are observable by listeners.
//!
//! ## Rules
//! - The hook is observability only: it never changes dispatch.
//! - Logger panics are caught and discarded.
//! - Activation: per emitter via [`DebugConfig::enabled`](crate::DebugConfig), for every
//!   emitter via [`set_debug_enabled`], or via the [`DEBUG_ENV`] environment variable
//!   read by [`Config::from_env`](crate::Config::from_env).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use asyncemit::{DebugRecord, Emitter};
//!
//! let emitter: Emitter<u32> = Emitter::builder()
//!     .name("orders")
//!     .debug(true)
//!     .logger(Arc::new(|rec: &DebugRecord<'_>| {
//!         eprintln!("[{}] {} {:?}", rec.emitter, rec.kind.as_label(), rec.event);
//!     }))
//!     .build();
//! # let _ = emitter;
//! ```

mod log;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use crate::events::{EventKey, ListenerId};

pub use log::DebugWriter;

/// Environment variable holding comma-separated emitter names (or `*`) to debug.
pub const DEBUG_ENV: &str = "ASYNCEMIT_DEBUG";

static GLOBAL_DEBUG: AtomicBool = AtomicBool::new(false);

/// Enables or disables the debug hook for every emitter in the process.
pub fn set_debug_enabled(enabled: bool) {
    GLOBAL_DEBUG.store(enabled, AtomicOrdering::Relaxed);
}

/// Returns the process-wide debug switch.
pub fn is_debug_enabled() -> bool {
    GLOBAL_DEBUG.load(AtomicOrdering::Relaxed)
}

/// Logger invoked with each debug record.
pub type DebugLogger = Arc<dyn Fn(&DebugRecord<'_>) + Send + Sync>;

/// Operation being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugKind {
    /// A listener (payload, any, or meta) was registered.
    Subscribe,
    /// A listener (payload, any, or meta) was removed.
    Unsubscribe,
    /// `emit` was called.
    Emit,
    /// `emit_serial` was called.
    EmitSerial,
    /// `clear`/`clear_all` was called.
    Clear,
}

impl DebugKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DebugKind::Subscribe => "subscribe",
            DebugKind::Unsubscribe => "unsubscribe",
            DebugKind::Emit => "emit",
            DebugKind::EmitSerial => "emit_serial",
            DebugKind::Clear => "clear",
        }
    }
}

/// One debug observation.
#[derive(Debug, Clone, Copy)]
pub struct DebugRecord<'a> {
    /// What happened.
    pub kind: DebugKind,
    /// Debug name of the emitter.
    pub emitter: &'a str,
    /// Event key involved; `None` for any-listeners and instance-wide clears.
    pub event: Option<&'a EventKey>,
    /// Listener involved, for subscribe/unsubscribe.
    pub listener: Option<ListenerId>,
}

/// Hands a record to the logger, swallowing panics.
pub(crate) fn report(logger: &DebugLogger, record: &DebugRecord<'_>) {
    if panic::catch_unwind(AssertUnwindSafe(|| logger(record))).is_err() {
        tracing::trace!(emitter = record.emitter, "debug logger panicked; ignored");
    }
}
