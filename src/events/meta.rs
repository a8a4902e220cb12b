//! # Meta events: announcements of listener additions and removals.
//!
//! Meta listeners live in their own table and are typed with [`ListenerChange`]
//! instead of the emitter payload. Adding or removing a meta listener never produces a
//! meta event, so subscribing to these events cannot recurse.

use crate::events::{EventKey, ListenerId};

/// Kind of meta event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaEvent {
    /// A listener was added (payload or any-listener).
    ListenerAdded,
    /// A listener was removed (payload or any-listener).
    ListenerRemoved,
}

impl MetaEvent {
    /// Returns the reserved key for this meta event.
    pub fn key(&self) -> EventKey {
        match self {
            MetaEvent::ListenerAdded => EventKey::listener_added(),
            MetaEvent::ListenerRemoved => EventKey::listener_removed(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            MetaEvent::ListenerAdded => "listener_added",
            MetaEvent::ListenerRemoved => "listener_removed",
        }
    }
}

/// Payload of a meta event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerChange {
    /// The listener that was added or removed.
    pub listener: ListenerId,
    /// The event key it was (un)registered for; `None` for any-listeners.
    pub event: Option<EventKey>,
}
