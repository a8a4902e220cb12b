//! Error types used by the emitter and its listeners.
//!
//! This module defines two main error enums:
//!
//! - [`Error`]: errors surfaced by emitter operations (argument validation, dispatch).
//! - [`ListenerError`]: errors raised by an individual listener invocation.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//!
//! ## Propagation
//! - Validation errors are returned synchronously by the call that violates the contract.
//! - Listener failures surface only through the [`Emission`](crate::Emission) future of
//!   the `emit`/`emit_serial` call that invoked the listener.

use thiserror::Error;

use crate::events::EventKey;

/// # Errors produced by emitter operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// A call violated the argument contract (empty key list, reserved key misuse).
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument.
        reason: String,
    },

    /// A listener failed while an event was being dispatched.
    #[error("listener for {event:?} failed: {source}")]
    Listener {
        /// The event being dispatched when the listener failed.
        event: EventKey,
        /// The listener's failure.
        #[source]
        source: ListenerError,
    },
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use asyncemit::Error;
    /// use asyncemit::ListenerError;
    ///
    /// let err = Error::Listener { event: "x".into(), source: ListenerError::fail("boom") };
    /// assert_eq!(err.as_label(), "emit_listener_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::InvalidArgument { .. } => "emit_invalid_argument",
            Error::Listener { .. } => "emit_listener_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            Error::InvalidArgument { reason } => format!("invalid argument: {reason}"),
            Error::Listener { event, source } => {
                format!("event={event:?} {}", source.as_message())
            }
        }
    }

    /// Returns the listener failure, if this error carries one.
    pub fn listener_error(&self) -> Option<&ListenerError> {
        match self {
            Error::Listener { source, .. } => Some(source),
            Error::InvalidArgument { .. } => None,
        }
    }
}

/// # Errors produced by a listener invocation.
///
/// A listener either returns [`ListenerError::Fail`] itself or panics; a panic is
/// caught by the dispatch engine and reported as [`ListenerError::Panicked`].
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// The listener reported a failure.
    #[error("listener failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The listener panicked.
    #[error("listener panicked: {info}")]
    Panicked {
        /// The panic message, if it could be extracted.
        info: String,
    },
}

impl ListenerError {
    /// Shorthand for [`ListenerError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        ListenerError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Fail { .. } => "listener_failed",
            ListenerError::Panicked { .. } => "listener_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ListenerError::Fail { error } => format!("error: {error}"),
            ListenerError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

impl From<String> for ListenerError {
    fn from(error: String) -> Self {
        ListenerError::Fail { error }
    }
}

impl From<&str> for ListenerError {
    fn from(error: &str) -> Self {
        ListenerError::fail(error)
    }
}
