//! # Example: emit_once
//!
//! Waits for the first of several events, and shows how failures surface.
//!
//! Demonstrates how to:
//! - Await one occurrence with [`Emitter::once`].
//! - Use [`Symbol`] keys next to string keys.
//! - Compare `emit` (run everyone, report first failure) with `emit_serial`
//!   (stop at the first failure).
//!
//! ## Flow
//! ```text
//! once(["ready", SHUTDOWN]) ──► Once future
//! emit("ready", ..)          ──► Once resolves, one-shot listener detaches
//! emit("job", ..)            ──► both listeners run ─► Err(first failure)
//! emit_serial("job", ..)     ──► failing listener runs ─► stop
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example emit_once
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use asyncemit::{Emitter, EventKey, Listener, ListenerError, Symbol};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let emitter: Emitter<String> = Emitter::new();
    let shutdown = Symbol::new("shutdown");

    // 1. Wait for whichever comes first
    let first = emitter.once(vec![EventKey::from("ready"), EventKey::from(&shutdown)])?;
    emitter.emit("ready", "warm".to_string())?.await?;
    println!("[once] resolved with {:?}", first.await);
    println!("[once] listeners left: {}", emitter.count(["ready"])?);

    // 2. A failing listener next to a healthy one
    let healthy_runs = Arc::new(AtomicUsize::new(0));
    emitter.on(
        "job",
        Listener::new(|payload: String| async move {
            Err(ListenerError::fail(format!("cannot process {payload}")))
        }),
    )?;
    let runs = Arc::clone(&healthy_runs);
    emitter.on(
        "job",
        Listener::new(move |_| {
            runs.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        }),
    )?;

    // 3. Concurrent: everyone runs, first failure is reported
    if let Err(err) = emitter.emit("job", "a".to_string())?.await {
        println!("[emit] {} ({})", err.as_message(), err.as_label());
    }
    // 4. Serial: stops at the failing listener
    if let Err(err) = emitter.emit_serial("job", "b".to_string())?.await {
        println!("[emit_serial] {}", err.as_message());
    }
    println!("[main] healthy listener ran {} time(s)", healthy_runs.load(Ordering::SeqCst));

    // 5. Nobody listens to the symbol any more
    emitter.emit(&shutdown, "bye".to_string())?.await?;
    Ok(())
}
