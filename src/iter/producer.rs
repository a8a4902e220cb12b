//! # Producer: buffered queue behind one event iterator.
//!
//! ## State machine
//! ```text
//!   Active(queue, !finished) ──finish()──► Draining(queue > 0) ──queue empties──► Ended
//!            │
//!            └────────────── close() ─────────────────────────────────────────► Ended
//!                            (unread items discarded)
//! ```
//!
//! ## Rules
//! - `enqueue` after `finish`/`close` is ignored.
//! - `pull` pops immediately when an item is queued, parks otherwise.
//! - Wake-ups use [`Notify::notify_one`], which stores a permit when nobody is parked,
//!   so a push racing with a consumer that is about to park is not lost.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use parking_lot::Mutex;
use tokio::sync::Notify;

static PRODUCER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Identity of a producer inside the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ProducerId(u64);

/// Observable phase of a producer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Active,
    Draining,
    Ended,
}

struct State<I> {
    queue: VecDeque<I>,
    finished: bool,
    ended: bool,
}

pub(crate) struct Producer<I> {
    id: ProducerId,
    state: Mutex<State<I>>,
    wake: Notify,
}

impl<I> Producer<I> {
    pub(crate) fn new() -> Self {
        Self {
            id: ProducerId(PRODUCER_SEQ.fetch_add(1, AtomicOrdering::Relaxed)),
            state: Mutex::new(State {
                queue: VecDeque::new(),
                finished: false,
                ended: false,
            }),
            wake: Notify::new(),
        }
    }

    pub(crate) fn id(&self) -> ProducerId {
        self.id
    }

    /// Appends an item unless the producer no longer accepts input.
    pub(crate) fn enqueue(&self, item: I) {
        {
            let mut st = self.state.lock();
            if st.finished || st.ended {
                return;
            }
            st.queue.push_back(item);
        }
        self.wake.notify_one();
    }

    /// Stops accepting items; already queued items stay readable.
    pub(crate) fn finish(&self) {
        self.state.lock().finished = true;
        self.wake.notify_one();
    }

    /// Ends the sequence at once, discarding unread items.
    ///
    /// Returns `false` if the producer had already ended.
    pub(crate) fn close(&self) -> bool {
        let first = {
            let mut st = self.state.lock();
            let first = !st.ended;
            st.ended = true;
            st.queue.clear();
            first
        };
        self.wake.notify_one();
        first
    }

    pub(crate) fn phase(&self) -> Phase {
        let st = self.state.lock();
        if st.ended || (st.finished && st.queue.is_empty()) {
            Phase::Ended
        } else if st.finished {
            Phase::Draining
        } else {
            Phase::Active
        }
    }

    /// Pops the next item, parking while the queue is empty and input is still open.
    ///
    /// Returns `None` once the sequence has ended.
    pub(crate) async fn pull(&self) -> Option<I> {
        loop {
            {
                let mut st = self.state.lock();
                if st.ended {
                    return None;
                }
                if let Some(item) = st.queue.pop_front() {
                    return Some(item);
                }
                if st.finished {
                    st.ended = true;
                    return None;
                }
            }
            self.wake.notified().await;
        }
    }
}
