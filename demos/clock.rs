//! # Example: clock
//!
//! A host type that owns an emitter and publishes `tick` events.
//!
//! Demonstrates how to:
//! - Give a type the emitter surface through [`Emits`].
//! - Consume events both with a [`Listener`] and as an iterator.
//! - End every iterator with [`Emits::clear_all`].
//! - Turn on the debug hook, routed through `tracing`.
//!
//! ## Flow
//! ```text
//! Clock::run()
//!     ├─► emit("tick", n)   ──► printer listener
//!     │                    └─► ticks iterator (buffered)
//!     └─► clear_all()       ──► ticks iterator drains and ends
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=asyncemit=debug cargo run --example clock
//! ```

use std::time::Duration;

use asyncemit::{Emits, Emitter, Listener};
use tracing_subscriber::EnvFilter;

struct Clock {
    events: Emitter<u64>,
}

impl Clock {
    fn new() -> Self {
        Self {
            events: Emitter::builder().name("clock").debug(true).build(),
        }
    }

    async fn run(&self, ticks: u64, every: Duration) -> Result<(), asyncemit::Error> {
        for n in 1..=ticks {
            tokio::time::sleep(every).await;
            self.emit("tick", n)?.await?;
        }
        self.clear_all();
        Ok(())
    }
}

impl Emits<u64> for Clock {
    fn emitter(&self) -> &Emitter<u64> {
        &self.events
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let clock = Clock::new();

    // 1. Push-style consumer
    clock.on(
        "tick",
        Listener::new(|n: u64| async move {
            println!("[printer] tick {n}");
            Ok(())
        }),
    )?;

    // 2. Pull-style consumer, registered before the first tick
    let mut ticks = clock.events("tick")?;
    let reader = tokio::spawn(async move {
        let mut seen = 0;
        while let Some(n) = ticks.next().await {
            println!("[reader] tick {n}");
            seen += 1;
        }
        seen
    });

    // 3. Run the clock; clear_all ends the reader
    clock.run(5, Duration::from_millis(100)).await?;

    let seen = reader.await?;
    println!("[main] reader saw {seen} ticks, listeners left: {}", clock.count_all());
    Ok(())
}
