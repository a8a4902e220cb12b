//! # Event keys: names and opaque symbols.
//!
//! An [`EventKey`] identifies a class of events. It is either a **name** (compared by
//! string content) or a [`Symbol`] (compared by token identity only).
//!
//! ## Rules
//! - Two names are equal iff their text is equal.
//! - Two symbols are equal iff they come from the same [`Symbol::new`] call (or a clone of it).
//! - A name never equals a symbol, even when the symbol description matches the name.
//!
//! ## Example
//! ```rust
//! use asyncemit::{EventKey, Symbol};
//!
//! let a = Symbol::new("tick");
//! let b = Symbol::new("tick");
//!
//! assert_ne!(EventKey::from(a.clone()), EventKey::from(b));
//! assert_eq!(EventKey::from(a.clone()), EventKey::from(a));
//! assert_ne!(EventKey::from("tick"), EventKey::from(Symbol::new("tick")));
//! ```

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

/// Token counter for symbols. Ids below `FIRST_USER_SYMBOL` are reserved.
static SYMBOL_SEQ: AtomicU64 = AtomicU64::new(FIRST_USER_SYMBOL);

const LISTENER_ADDED_ID: u64 = 0;
const LISTENER_REMOVED_ID: u64 = 1;
const FIRST_USER_SYMBOL: u64 = 16;

/// Opaque, identity-compared event token.
///
/// The description is informational only; it takes no part in equality or hashing.
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    description: Option<Cow<'static, str>>,
}

impl Symbol {
    /// Allocates a fresh symbol with a description used in logs.
    pub fn new(description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: SYMBOL_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            description: Some(description.into()),
        }
    }

    /// Allocates a fresh symbol without a description.
    pub fn anonymous() -> Self {
        Self {
            id: SYMBOL_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            description: None,
        }
    }

    /// Returns the description given at creation, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) const fn reserved(id: u64, description: &'static str) -> Self {
        Self {
            id,
            description: Some(Cow::Borrowed(description)),
        }
    }

    fn is_reserved(&self) -> bool {
        self.id < FIRST_USER_SYMBOL
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(d) => write!(f, "Symbol({d})"),
            None => write!(f, "Symbol(#{})", self.id),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Identifier for an event class.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    /// Event identified by its name.
    Name(Arc<str>),
    /// Event identified by an opaque token.
    Symbol(Symbol),
}

impl EventKey {
    /// Reserved key under which listener additions are announced.
    pub fn listener_added() -> Self {
        EventKey::Symbol(Symbol::reserved(LISTENER_ADDED_ID, "listenerAdded"))
    }

    /// Reserved key under which listener removals are announced.
    pub fn listener_removed() -> Self {
        EventKey::Symbol(Symbol::reserved(LISTENER_REMOVED_ID, "listenerRemoved"))
    }

    /// Returns `true` for keys owned by the emitter itself (meta events).
    pub fn is_reserved(&self) -> bool {
        matches!(self, EventKey::Symbol(s) if s.is_reserved())
    }

    /// Returns the name, if this key is a name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            EventKey::Name(n) => Some(n),
            EventKey::Symbol(_) => None,
        }
    }
}

impl fmt::Debug for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKey::Name(n) => write!(f, "{n:?}"),
            EventKey::Symbol(s) => fmt::Debug::fmt(s, f),
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKey::Name(n) => f.write_str(n),
            EventKey::Symbol(s) => fmt::Display::fmt(s, f),
        }
    }
}

impl From<&str> for EventKey {
    fn from(name: &str) -> Self {
        EventKey::Name(Arc::from(name))
    }
}

impl From<String> for EventKey {
    fn from(name: String) -> Self {
        EventKey::Name(Arc::from(name))
    }
}

impl From<&String> for EventKey {
    fn from(name: &String) -> Self {
        EventKey::Name(Arc::from(name.as_str()))
    }
}

impl From<Arc<str>> for EventKey {
    fn from(name: Arc<str>) -> Self {
        EventKey::Name(name)
    }
}

impl From<Symbol> for EventKey {
    fn from(symbol: Symbol) -> Self {
        EventKey::Symbol(symbol)
    }
}

impl From<&Symbol> for EventKey {
    fn from(symbol: &Symbol) -> Self {
        EventKey::Symbol(symbol.clone())
    }
}

impl From<&EventKey> for EventKey {
    fn from(key: &EventKey) -> Self {
        key.clone()
    }
}

/// One or more event keys: the argument type of multi-key operations.
///
/// Built from a single key-like value or from an array/slice/vector of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventKeys(Vec<EventKey>);

impl EventKeys {
    /// Returns the keys in the order given.
    pub fn as_slice(&self) -> &[EventKey] {
        &self.0
    }

    /// Returns `true` if no key was given.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn into_vec(self) -> Vec<EventKey> {
        self.0
    }
}

impl From<EventKey> for EventKeys {
    fn from(key: EventKey) -> Self {
        EventKeys(vec![key])
    }
}

impl From<&EventKey> for EventKeys {
    fn from(key: &EventKey) -> Self {
        EventKeys(vec![key.clone()])
    }
}

impl From<&str> for EventKeys {
    fn from(name: &str) -> Self {
        EventKeys(vec![name.into()])
    }
}

impl From<String> for EventKeys {
    fn from(name: String) -> Self {
        EventKeys(vec![name.into()])
    }
}

impl From<Symbol> for EventKeys {
    fn from(symbol: Symbol) -> Self {
        EventKeys(vec![symbol.into()])
    }
}

impl From<&Symbol> for EventKeys {
    fn from(symbol: &Symbol) -> Self {
        EventKeys(vec![symbol.into()])
    }
}

impl<K: Into<EventKey>> From<Vec<K>> for EventKeys {
    fn from(keys: Vec<K>) -> Self {
        EventKeys(keys.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<EventKey>, const N: usize> From<[K; N]> for EventKeys {
    fn from(keys: [K; N]) -> Self {
        EventKeys(keys.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<EventKey> + Clone> From<&[K]> for EventKeys {
    fn from(keys: &[K]) -> Self {
        EventKeys(keys.iter().cloned().map(Into::into).collect())
    }
}
