//! # DebugWriter: default debug logger
//!
//! Writes [`DebugRecord`]s through `tracing` at `DEBUG` level under the
//! `asyncemit::debug` target.
//!
//! ## Example output
//! ```text
//! DEBUG asyncemit::debug: subscribe emitter="orders" event=Some("created") listener=Some(listener#3)
//! DEBUG asyncemit::debug: emit emitter="orders" event=Some("created") listener=None
//! DEBUG asyncemit::debug: clear emitter="orders" event=None listener=None
//! ```

use std::sync::Arc;

use super::{DebugLogger, DebugRecord};

/// Default logger: forwards records to `tracing`.
#[derive(Default, Clone, Copy, Debug)]
pub struct DebugWriter;

impl DebugWriter {
    /// Construct a new [`DebugWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Writes one record.
    pub fn write(&self, rec: &DebugRecord<'_>) {
        tracing::debug!(
            target: "asyncemit::debug",
            emitter = rec.emitter,
            event = ?rec.event,
            listener = ?rec.listener.map(|id| id.to_string()),
            "{}",
            rec.kind.as_label()
        );
    }

    /// Returns this writer as a [`DebugLogger`].
    pub fn into_logger(self) -> DebugLogger {
        Arc::new(move |rec: &DebugRecord<'_>| self.write(rec))
    }
}
