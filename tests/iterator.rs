use std::time::Duration;

use asyncemit::{Emitter, Error, EventKey, Symbol};
use futures::StreamExt;

#[tokio::test]
async fn test_events_buffer_before_first_pull() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let mut it = emitter.events("x")?;

    emitter.emit("x", 1)?.await?;
    emitter.emit("x", 2)?.await?;
    emitter.emit("x", 3)?.await?;

    assert_eq!(it.next().await, Some(1));
    assert_eq!(it.next().await, Some(2));
    assert_eq!(it.next().await, Some(3));
    Ok(())
}

#[tokio::test]
async fn test_events_are_queued_at_emit_call_time() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let mut it = emitter.events("x")?;

    let pending = emitter.emit("x", 7)?;
    assert_eq!(it.next().await, Some(7));
    pending.await?;
    Ok(())
}

#[tokio::test]
async fn test_emit_serial_feeds_iterators() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let mut it = emitter.events("x")?;

    emitter.emit_serial("x", 5)?.await?;
    assert_eq!(it.next().await, Some(5));
    Ok(())
}

#[tokio::test]
async fn test_events_over_several_keys() -> Result<(), Error> {
    let emitter: Emitter<&'static str> = Emitter::new();
    let mut it = emitter.events(["a", "b"])?;

    emitter.emit("a", "first")?.await?;
    emitter.emit("c", "ignored")?.await?;
    emitter.emit("b", "second")?.await?;

    assert_eq!(it.next().await, Some("first"));
    assert_eq!(it.next().await, Some("second"));
    Ok(())
}

#[tokio::test]
async fn test_parked_next_wakes_on_emit() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let mut it = emitter.events("x")?;

    let consumer = tokio::spawn(async move { it.next().await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    emitter.emit("x", 42)?.await?;

    assert_eq!(consumer.await.expect("consumer panicked"), Some(42));
    Ok(())
}

#[tokio::test]
async fn test_clear_drains_buffer_then_ends() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let mut it = emitter.events("x")?;

    emitter.emit("x", 1)?.await?;
    emitter.clear("x")?;
    emitter.emit("x", 2)?.await?;

    assert_eq!(it.next().await, Some(1));
    assert_eq!(it.next().await, None);
    assert!(it.is_ended());
    Ok(())
}

#[tokio::test]
async fn test_clear_wakes_parked_next() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let mut it = emitter.events("x")?;

    let consumer = tokio::spawn(async move { it.next().await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    emitter.clear_all();

    assert_eq!(consumer.await.expect("consumer panicked"), None);
    Ok(())
}

#[tokio::test]
async fn test_close_ends_and_unregisters() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let mut it = emitter.events("x")?;
    assert_eq!(emitter.count("x")?, 1);

    emitter.emit("x", 1)?.await?;
    it.close();
    it.close();

    assert_eq!(emitter.count("x")?, 0);
    assert_eq!(it.next().await, None);
    emitter.emit("x", 2)?.await?;
    assert_eq!(it.next().await, None);
    Ok(())
}

#[tokio::test]
async fn test_close_with_returns_value() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let mut it = emitter.events("x")?;

    let value = it.close_with(async { "done" }).await;
    assert_eq!(value, "done");
    assert_eq!(it.next().await, None);
    Ok(())
}

#[tokio::test]
async fn test_dropping_iterator_unregisters() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let it = emitter.events(["x", "y"])?;
    let any = emitter.any_event();
    assert_eq!(emitter.count("x")?, 2);
    assert_eq!(emitter.count_all(), 3);

    drop(it);
    drop(any);
    assert_eq!(emitter.count_all(), 0);
    Ok(())
}

#[tokio::test]
async fn test_clearing_one_key_ends_multi_key_iterator() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let mut it = emitter.events(["a", "b"])?;

    emitter.emit("b", 1)?.await?;
    emitter.clear("a")?;
    assert_eq!(emitter.count("b")?, 0);
    assert_eq!(emitter.count_all(), 0);

    emitter.emit("b", 2)?.await?;
    assert_eq!(it.next().await, Some(1));
    assert_eq!(it.next().await, None);
    Ok(())
}

#[tokio::test]
async fn test_drained_iterator_unregisters_on_drop() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let mut it = emitter.events(["a", "b"])?;
    let mut any = emitter.any_event();

    emitter.clear("a")?;
    assert_eq!(it.next().await, None);
    assert!(it.is_ended());
    drop(it);

    emitter.clear_all();
    assert_eq!(any.next().await, None);
    drop(any);

    assert_eq!(emitter.count(["a", "b"])?, 0);
    assert_eq!(emitter.count_all(), 0);
    Ok(())
}

#[tokio::test]
async fn test_any_event_pairs_keys_with_payloads() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let mut it = emitter.any_event();
    let sym = Symbol::new("tick");

    emitter.emit("x", 1)?.await?;
    emitter.emit(&sym, 2)?.await?;
    emitter.emit_serial("y", 3)?.await?;

    assert_eq!(it.next().await, Some((EventKey::from("x"), 1)));
    assert_eq!(it.next().await, Some((EventKey::from(&sym), 2)));
    assert_eq!(it.next().await, Some((EventKey::from("y"), 3)));
    Ok(())
}

#[tokio::test]
async fn test_clear_all_ends_any_iterators() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let mut it = emitter.any_event();

    emitter.emit("x", 1)?.await?;
    emitter.clear_all();

    assert_eq!(it.next().await, Some((EventKey::from("x"), 1)));
    assert_eq!(it.next().await, None);
    Ok(())
}

#[tokio::test]
async fn test_into_stream_yields_until_cleared() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let stream = emitter.events("x")?.into_stream();

    for n in 1..=3 {
        emitter.emit("x", n)?.await?;
    }
    emitter.clear("x")?;

    let items: Vec<u32> = stream.collect().await;
    assert_eq!(items, vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn test_symbol_keys_are_distinct_from_names() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let sym = Symbol::new("x");
    let mut by_symbol = emitter.events(&sym)?;
    let mut by_name = emitter.events("x")?;

    emitter.emit("x", 1)?.await?;
    emitter.emit(&sym, 2)?.await?;
    emitter.clear_all();

    assert_eq!(by_name.next().await, Some(1));
    assert_eq!(by_name.next().await, None);
    assert_eq!(by_symbol.next().await, Some(2));
    assert_eq!(by_symbol.next().await, None);
    Ok(())
}

#[tokio::test]
async fn test_meta_keys_cannot_be_iterated() {
    let emitter: Emitter<u32> = Emitter::new();
    assert!(emitter.events(EventKey::listener_added()).is_err());
    assert!(emitter.events(Vec::<EventKey>::new()).is_err());
}
