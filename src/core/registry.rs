//! # Subscription registry - listener sets and iterator producers.
//!
//! The registry is plain data owned by one emitter, mutated only under the emitter's
//! lock and never across an await point.
//!
//! ## Layout
//! ```text
//! Registry
//!   ├─ events:        EventKey ─► IndexMap<ListenerId, Listener<T>>     (insertion order)
//!   ├─ any:           IndexMap<ListenerId, AnyListener<T>>
//!   ├─ producers:     EventKey ─► IndexMap<ProducerId, Producer<T>>
//!   ├─ any_producers: IndexMap<ProducerId, Producer<(EventKey, T)>>
//!   └─ meta:          MetaEvent ─► IndexMap<ListenerId, Listener<ListenerChange>>
//! ```
//!
//! ## Rules
//! - A listener id appears at most once per set; re-insertion keeps the first position.
//! - Removal preserves the relative order of the remaining listeners.
//! - Empty per-key sets are dropped so the maps do not grow with dead keys.
//! - Clearing finishes producers (buffered items stay readable) and detaches them.
//! - Removed listeners are handed back to the caller so they are dropped after the
//!   emitter lock is released (a listener may own an iterator whose drop re-locks).

use std::sync::Arc;

use indexmap::IndexMap;

use crate::events::{AnyListener, EventKey, Listener, ListenerChange, ListenerId, MetaEvent};
use crate::iter::{Producer, ProducerId};

type ListenerSet<L> = IndexMap<ListenerId, L>;
type ProducerSet<I> = IndexMap<ProducerId, Arc<Producer<I>>>;

/// Recipients frozen at dispatch time.
pub(crate) struct Snapshot<T> {
    pub(crate) listeners: Vec<Listener<T>>,
    pub(crate) any: Vec<AnyListener<T>>,
}

/// Listeners removed by [`Registry::clear_all`].
pub(crate) struct Cleared<T> {
    pub(crate) listeners: Vec<(EventKey, Listener<T>)>,
    pub(crate) any: Vec<AnyListener<T>>,
}

pub(crate) struct Registry<T> {
    events: IndexMap<EventKey, ListenerSet<Listener<T>>>,
    any: ListenerSet<AnyListener<T>>,
    producers: IndexMap<EventKey, ProducerSet<T>>,
    any_producers: ProducerSet<(EventKey, T)>,
    meta: IndexMap<MetaEvent, ListenerSet<Listener<ListenerChange>>>,
}

impl<T: Clone> Registry<T> {
    pub(crate) fn new() -> Self {
        Self {
            events: IndexMap::new(),
            any: IndexMap::new(),
            producers: IndexMap::new(),
            any_producers: IndexMap::new(),
            meta: IndexMap::new(),
        }
    }

    // ---------------------------
    // Listeners
    // ---------------------------

    /// Adds a listener; returns `false` if it was already registered for `key`.
    pub(crate) fn insert(&mut self, key: &EventKey, listener: &Listener<T>) -> bool {
        let set = self.events.entry(key.clone()).or_default();
        if set.contains_key(&listener.id()) {
            return false;
        }
        set.insert(listener.id(), listener.clone());
        true
    }

    /// Removes one listener, returning it if it was registered for `key`.
    pub(crate) fn remove(&mut self, key: &EventKey, id: ListenerId) -> Option<Listener<T>> {
        let set = self.events.get_mut(key)?;
        let removed = set.shift_remove(&id);
        if set.is_empty() {
            self.events.shift_remove(key);
        }
        removed
    }

    /// Removes every listener of `key`, in registration order.
    pub(crate) fn remove_all(&mut self, key: &EventKey) -> Vec<Listener<T>> {
        self.events
            .shift_remove(key)
            .map(|set| set.into_values().collect())
            .unwrap_or_default()
    }

    pub(crate) fn contains(&self, key: &EventKey, id: ListenerId) -> bool {
        self.events
            .get(key)
            .is_some_and(|set| set.contains_key(&id))
    }

    pub(crate) fn insert_any(&mut self, listener: &AnyListener<T>) -> bool {
        if self.any.contains_key(&listener.id()) {
            return false;
        }
        self.any.insert(listener.id(), listener.clone());
        true
    }

    pub(crate) fn remove_any(&mut self, id: ListenerId) -> Option<AnyListener<T>> {
        self.any.shift_remove(&id)
    }

    pub(crate) fn remove_all_any(&mut self) -> Vec<AnyListener<T>> {
        std::mem::take(&mut self.any).into_values().collect()
    }

    pub(crate) fn contains_any(&self, id: ListenerId) -> bool {
        self.any.contains_key(&id)
    }

    /// Copies the current recipients of `key`.
    pub(crate) fn snapshot(&self, key: &EventKey) -> Snapshot<T> {
        Snapshot {
            listeners: self
                .events
                .get(key)
                .map(|set| set.values().cloned().collect())
                .unwrap_or_default(),
            any: self.any.values().cloned().collect(),
        }
    }

    // ---------------------------
    // Meta listeners
    // ---------------------------

    pub(crate) fn insert_meta(
        &mut self,
        kind: MetaEvent,
        listener: &Listener<ListenerChange>,
    ) -> bool {
        let set = self.meta.entry(kind).or_default();
        if set.contains_key(&listener.id()) {
            return false;
        }
        set.insert(listener.id(), listener.clone());
        true
    }

    pub(crate) fn remove_meta(
        &mut self,
        kind: MetaEvent,
        id: ListenerId,
    ) -> Option<Listener<ListenerChange>> {
        self.meta.get_mut(&kind)?.shift_remove(&id)
    }

    pub(crate) fn contains_meta(&self, kind: MetaEvent, id: ListenerId) -> bool {
        self.meta
            .get(&kind)
            .is_some_and(|set| set.contains_key(&id))
    }

    pub(crate) fn meta_snapshot(&self, kind: MetaEvent) -> Vec<Listener<ListenerChange>> {
        self.meta
            .get(&kind)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    // ---------------------------
    // Producers
    // ---------------------------

    pub(crate) fn attach_producer(&mut self, key: &EventKey, producer: Arc<Producer<T>>) {
        self.producers
            .entry(key.clone())
            .or_default()
            .insert(producer.id(), producer);
    }

    pub(crate) fn detach_producer(&mut self, key: &EventKey, id: ProducerId) {
        if let Some(set) = self.producers.get_mut(key) {
            set.shift_remove(&id);
            if set.is_empty() {
                self.producers.shift_remove(key);
            }
        }
    }

    pub(crate) fn attach_any_producer(&mut self, producer: Arc<Producer<(EventKey, T)>>) {
        self.any_producers.insert(producer.id(), producer);
    }

    pub(crate) fn detach_any_producer(&mut self, id: ProducerId) {
        self.any_producers.shift_remove(&id);
    }

    /// Buffers `data` into every producer attached to `key` and into every any-producer.
    pub(crate) fn enqueue(&self, key: &EventKey, data: &T) {
        if let Some(set) = self.producers.get(key) {
            for producer in set.values() {
                producer.enqueue(data.clone());
            }
        }
        for producer in self.any_producers.values() {
            producer.enqueue((key.clone(), data.clone()));
        }
    }

    // ---------------------------
    // Housekeeping
    // ---------------------------

    /// Listener count for `key`, counting iterators as listeners.
    pub(crate) fn count(&self, key: &EventKey) -> usize {
        self.events.get(key).map_or(0, IndexMap::len)
            + self.producers.get(key).map_or(0, IndexMap::len)
            + self.any.len()
            + self.any_producers.len()
    }

    /// Instance-wide listener count, counting iterators as listeners.
    ///
    /// An iterator over several keys counts once per key, like a listener subscribed to
    /// several keys.
    pub(crate) fn count_all(&self) -> usize {
        self.events.values().map(IndexMap::len).sum::<usize>()
            + self.producers.values().map(IndexMap::len).sum::<usize>()
            + self.any.len()
            + self.any_producers.len()
    }

    /// Empties `key`'s listener set and finishes its producers.
    ///
    /// Finished producers are detached from every key. Returns the removed listeners.
    pub(crate) fn clear(&mut self, key: &EventKey) -> Vec<Listener<T>> {
        if let Some(set) = self.producers.shift_remove(key) {
            for producer in set.values() {
                producer.finish();
            }
            // A producer created for several keys has ended for all of them.
            self.producers.retain(|_, other| {
                other.retain(|id, _| !set.contains_key(id));
                !other.is_empty()
            });
        }
        self.remove_all(key)
    }

    /// Empties every listener set and finishes every producer.
    ///
    /// Meta listeners are kept: they observe the removals this produces.
    pub(crate) fn clear_all(&mut self) -> Cleared<T> {
        for set in std::mem::take(&mut self.producers).into_values() {
            for producer in set.values() {
                producer.finish();
            }
        }
        for producer in std::mem::take(&mut self.any_producers).into_values() {
            producer.finish();
        }

        let mut listeners = Vec::new();
        for (key, set) in std::mem::take(&mut self.events) {
            listeners.extend(set.into_values().map(|l| (key.clone(), l)));
        }
        Cleared {
            listeners,
            any: self.remove_all_any(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listener() -> Listener<u32> {
        Listener::new(|_| async { Ok(()) })
    }

    fn any_listener() -> AnyListener<u32> {
        AnyListener::new(|_, _| async { Ok(()) })
    }

    #[test]
    fn test_insert_dedupes_and_keeps_position() {
        let mut reg = Registry::new();
        let key = EventKey::from("x");
        let (a, b) = (listener(), listener());

        assert!(reg.insert(&key, &a));
        assert!(reg.insert(&key, &b));
        assert!(!reg.insert(&key, &a));

        let ids: Vec<_> = reg.snapshot(&key).listeners.iter().map(Listener::id).collect();
        assert_eq!(ids, vec![a.id(), b.id()]);
        assert_eq!(reg.count(&key), 2);
    }

    #[test]
    fn test_remove_preserves_order_and_drops_empty_sets() {
        let mut reg = Registry::new();
        let key = EventKey::from("x");
        let (a, b, c) = (listener(), listener(), listener());
        reg.insert(&key, &a);
        reg.insert(&key, &b);
        reg.insert(&key, &c);

        assert!(reg.remove(&key, b.id()).is_some());
        assert!(reg.remove(&key, b.id()).is_none());
        let ids: Vec<_> = reg.snapshot(&key).listeners.iter().map(Listener::id).collect();
        assert_eq!(ids, vec![a.id(), c.id()]);

        reg.remove(&key, a.id());
        reg.remove(&key, c.id());
        assert!(reg.events.is_empty());
    }

    #[test]
    fn test_count_includes_any_and_producers() {
        let mut reg = Registry::new();
        let x = EventKey::from("x");
        let y = EventKey::from("y");
        reg.insert(&x, &listener());
        reg.insert(&y, &listener());
        reg.insert_any(&any_listener());
        reg.attach_producer(&x, Arc::new(Producer::new()));

        assert_eq!(reg.count(&x), 3);
        assert_eq!(reg.count(&y), 2);
        assert_eq!(reg.count_all(), 4);
    }

    #[tokio::test]
    async fn test_clear_finishes_producers_but_keeps_buffer() {
        let mut reg = Registry::new();
        let x = EventKey::from("x");
        let p = Arc::new(Producer::new());
        reg.attach_producer(&x, Arc::clone(&p));
        reg.insert(&x, &listener());

        reg.enqueue(&x, &7);
        let removed = reg.clear(&x);
        assert_eq!(removed.len(), 1);
        assert_eq!(reg.count_all(), 0);

        reg.enqueue(&x, &8);
        assert_eq!(p.pull().await, Some(7));
        assert_eq!(p.pull().await, None);
    }

    #[tokio::test]
    async fn test_clear_detaches_multi_key_producer_everywhere() {
        let mut reg: Registry<u32> = Registry::new();
        let (a, b) = (EventKey::from("a"), EventKey::from("b"));
        let p = Arc::new(Producer::new());
        reg.attach_producer(&a, Arc::clone(&p));
        reg.attach_producer(&b, Arc::clone(&p));
        assert_eq!(reg.count_all(), 2);

        reg.clear(&a);
        assert_eq!(reg.count(&b), 0);
        assert!(reg.producers.is_empty());

        reg.enqueue(&b, &1);
        assert_eq!(p.pull().await, None);
    }

    #[tokio::test]
    async fn test_any_producer_receives_key_and_data() {
        let mut reg = Registry::new();
        let p = Arc::new(Producer::new());
        reg.attach_any_producer(Arc::clone(&p));

        reg.enqueue(&EventKey::from("x"), &1);
        reg.enqueue(&EventKey::from("y"), &2);

        assert_eq!(p.pull().await, Some((EventKey::from("x"), 1)));
        assert_eq!(p.pull().await, Some((EventKey::from("y"), 2)));

        let cleared = reg.clear_all();
        assert!(cleared.listeners.is_empty() && cleared.any.is_empty());
        assert_eq!(p.pull().await, None);
    }

    #[test]
    fn test_meta_listeners_are_not_counted() {
        let mut reg: Registry<u32> = Registry::new();
        let meta: Listener<ListenerChange> = Listener::new(|_| async { Ok(()) });
        assert!(reg.insert_meta(MetaEvent::ListenerAdded, &meta));
        assert!(!reg.insert_meta(MetaEvent::ListenerAdded, &meta));
        assert!(reg.contains_meta(MetaEvent::ListenerAdded, meta.id()));
        assert_eq!(reg.count_all(), 0);
        assert!(reg.remove_meta(MetaEvent::ListenerAdded, meta.id()).is_some());
        assert!(reg.meta_snapshot(MetaEvent::ListenerAdded).is_empty());
    }
}
