//! # Dispatch engine: concurrent and serial fan-out of one emission.
//!
//! ## Architecture
//! ```text
//! emit(key, data)                                 (synchronous part, in Emitter)
//!     ├─► validate key
//!     ├─► enqueue into producers(key) + any-producers
//!     └─► snapshot = listeners(key) ++ any-listeners
//!
//! Emission future                                 (this module)
//!     ├─► yield_now()                  scheduling boundary
//!     ├─► Concurrent: join_all(call_1 .. call_n)
//!     │      └─► first error by snapshot position wins
//!     └─► Serial: call_1.await? ─► call_2.await? ─► ...
//!            └─► first error stops the loop
//!
//! call_i:
//!     still registered? ──no──► skip (Ok)
//!            │yes
//!            └──► listener.call(data)   (panic caught → ListenerError::Panicked)
//! ```
//!
//! ## Rules
//! - Recipients are frozen by the snapshot: listeners added later never see this event.
//! - A snapshotted listener removed before its turn is skipped.
//! - Concurrent dispatch never cancels: every call runs to completion even after a failure.
//! - Each call is a lazy future, so "its turn" is the moment it is first polled.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;

use super::emitter::Shared;
use super::registry::Snapshot;
use crate::error::{Error, ListenerError};
use crate::events::{EventKey, Listener, ListenerChange, MetaEvent};

type Call = BoxFuture<'static, Result<(), ListenerError>>;

/// Dispatch discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// All calls start in snapshot order and run interleaved.
    Concurrent,
    /// One call at a time, stopping at the first failure.
    Serial,
}

/// Completion signal of one `emit`/`emit_serial` call.
///
/// Resolves once every snapshotted listener has settled (concurrent) or once the
/// listeners ran in order or one failed (serial).
#[must_use = "an emission does nothing unless awaited"]
pub struct Emission {
    inner: BoxFuture<'static, Result<(), Error>>,
}

impl Future for Emission {
    type Output = Result<(), Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emission").finish_non_exhaustive()
    }
}

/// Builds the emission for a snapshot taken by the emitter.
pub(crate) fn emission<T>(
    shared: &Arc<Shared<T>>,
    key: EventKey,
    data: T,
    snapshot: Snapshot<T>,
    mode: Mode,
) -> Emission
where
    T: Clone + Send + 'static,
{
    let mut calls: Vec<Call> = Vec::with_capacity(snapshot.listeners.len() + snapshot.any.len());

    for listener in snapshot.listeners {
        let (shared, key, data) = (Arc::clone(shared), key.clone(), data.clone());
        let id = listener.id();
        calls.push(guarded(
            move || {
                let reg = shared.registry.lock();
                reg.contains(&key, id)
            },
            async move { listener.call(data).await },
        ));
    }
    for listener in snapshot.any {
        let (shared, key, data) = (Arc::clone(shared), key.clone(), data.clone());
        let id = listener.id();
        calls.push(guarded(
            move || {
                let reg = shared.registry.lock();
                reg.contains_any(id)
            },
            async move { listener.call(key, data).await },
        ));
    }

    tracing::trace!(event = ?key, recipients = calls.len(), ?mode, "emission prepared");
    Emission {
        inner: run(key, calls, mode).boxed(),
    }
}

/// Builds the concurrent emission of a meta event.
pub(crate) fn meta_emission<T>(
    shared: &Arc<Shared<T>>,
    kind: MetaEvent,
    change: ListenerChange,
    listeners: Vec<Listener<ListenerChange>>,
) -> Emission
where
    T: Clone + Send + 'static,
{
    let calls: Vec<Call> = listeners
        .into_iter()
        .map(|listener| {
            let (shared, change) = (Arc::clone(shared), change.clone());
            let id = listener.id();
            guarded(
                move || {
                    let reg = shared.registry.lock();
                    reg.contains_meta(kind, id)
                },
                async move { listener.call(change).await },
            )
        })
        .collect();

    Emission {
        inner: run(kind.key(), calls, Mode::Concurrent).boxed(),
    }
}

/// Wraps an invocation so it only runs if the listener is still registered when reached.
fn guarded<L, F>(is_live: L, invoke: F) -> Call
where
    L: FnOnce() -> bool + Send + 'static,
    F: Future<Output = Result<(), ListenerError>> + Send + 'static,
{
    async move {
        if !is_live() {
            tracing::trace!("listener removed after snapshot; skipped");
            return Ok(());
        }
        invoke.await
    }
    .boxed()
}

async fn run(key: EventKey, calls: Vec<Call>, mode: Mode) -> Result<(), Error> {
    tokio::task::yield_now().await;

    match mode {
        Mode::Concurrent => {
            let failure = join_all(calls).await.into_iter().find_map(Result::err);
            match failure {
                Some(source) => {
                    tracing::debug!(event = ?key, error = %source, "emission failed");
                    Err(Error::Listener { event: key, source })
                }
                None => Ok(()),
            }
        }
        Mode::Serial => {
            for call in calls {
                if let Err(source) = call.await {
                    tracing::debug!(event = ?key, error = %source, "serial emission stopped");
                    return Err(Error::Listener { event: key, source });
                }
            }
            Ok(())
        }
    }
}
