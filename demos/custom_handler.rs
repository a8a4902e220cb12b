//! # Example: custom_handler
//!
//! Demonstrates how to build listeners from types instead of closures.
//!
//! Shows how to:
//! - Implement the [`Handler`] and [`AnyHandler`] traits.
//! - Observe subscription changes with [`Emitter::on_meta`].
//! - Read every event through [`Emitter::any_event`] as a `Stream`.
//!
//! ## Flow
//! ```text
//! on("order", AuditLog) ──► MetaEvent::ListenerAdded ──► meta printer
//! emit("order", ..)
//!     ├─► AuditLog.handle()
//!     ├─► Metrics.handle(key, ..)
//!     └─► any_event() stream
//! clear_all()          ──► MetaEvent::ListenerRemoved (x2) ──► meta printer
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example custom_handler
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use asyncemit::{
    AnyHandler, AnyListener, Emitter, EventKey, Handler, Listener, ListenerChange, ListenerError,
    MetaEvent,
};
use futures::StreamExt;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct Order {
    id: u64,
    amount: u64,
}

/// Rejects empty orders, logs the rest.
struct AuditLog;

#[async_trait::async_trait]
impl Handler<Order> for AuditLog {
    async fn handle(&self, order: Order) -> Result<(), ListenerError> {
        if order.amount == 0 {
            return Err(ListenerError::fail(format!("order {} is empty", order.id)));
        }
        tracing::info!(order = order.id, amount = order.amount, "audited");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "audit-log"
    }
}

/// Sums amounts over every event.
#[derive(Default)]
struct Metrics {
    total: AtomicU64,
}

#[async_trait::async_trait]
impl AnyHandler<Order> for Metrics {
    async fn handle(&self, key: EventKey, order: Order) -> Result<(), ListenerError> {
        let total = self.total.fetch_add(order.amount, Ordering::SeqCst) + order.amount;
        tracing::info!(event = %key, total, "metrics updated");
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let emitter: Emitter<Order> = Emitter::new();

    // 1. Meta listeners
    for kind in [MetaEvent::ListenerAdded, MetaEvent::ListenerRemoved] {
        emitter.on_meta(
            kind,
            Listener::new(move |change: ListenerChange| async move {
                println!("[meta] {} {} on {:?}", kind.as_label(), change.listener, change.event);
                Ok(())
            }),
        );
    }

    // 2. Handlers
    let audit = Listener::from_handler(Arc::new(AuditLog));
    println!("[main] subscribing {}", audit.name());
    emitter.on("order", audit)?;
    let metrics = Arc::new(Metrics::default());
    emitter.on_any(AnyListener::from_handler(Arc::clone(&metrics)));

    // 3. Stream of everything
    let everything = emitter.any_event().into_stream();

    // 4. Publish
    for (id, amount) in [(1, 30), (2, 0), (3, 12)] {
        if let Err(err) = emitter.emit("order", Order { id, amount })?.await {
            println!("[main] rejected: {}", err.as_message());
        }
    }

    // 5. End the stream and collect it
    emitter.clear_all();
    let seen: Vec<(EventKey, Order)> = everything.collect().await;
    println!(
        "[main] stream saw {} events, total amount {}",
        seen.len(),
        metrics.total.load(Ordering::SeqCst)
    );

    // Let spawned meta emissions print before exit.
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    Ok(())
}
