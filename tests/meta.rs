use std::sync::Arc;
use std::time::Duration;

use asyncemit::{
    AnyListener, DebugKind, DebugLogger, DebugRecord, Emitter, Error, EventKey, Listener,
    ListenerChange, ListenerError, MetaEvent,
};
use parking_lot::Mutex;
use tokio::sync::mpsc;

type Changes = (MetaEvent, ListenerChange);

fn forward(tx: mpsc::UnboundedSender<Changes>, kind: MetaEvent) -> Listener<ListenerChange> {
    Listener::new(move |change| {
        let _ = tx.send((kind, change));
        async { Ok(()) }
    })
}

async fn recv(rx: &mut mpsc::UnboundedReceiver<Changes>) -> Changes {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("meta event not delivered")
        .expect("meta channel closed")
}

#[tokio::test]
async fn test_meta_events_announce_changes() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    emitter.on_meta(MetaEvent::ListenerAdded, forward(tx.clone(), MetaEvent::ListenerAdded));
    emitter.on_meta(MetaEvent::ListenerRemoved, forward(tx, MetaEvent::ListenerRemoved));

    let l = Listener::new(|_: u32| async { Ok(()) });
    let off = emitter.on("x", l.clone())?;

    let (kind, change) = recv(&mut rx).await;
    assert_eq!(kind, MetaEvent::ListenerAdded);
    assert_eq!(change.listener, l.id());
    assert_eq!(change.event, Some(EventKey::from("x")));

    off.unsubscribe();
    let (kind, change) = recv(&mut rx).await;
    assert_eq!(kind, MetaEvent::ListenerRemoved);
    assert_eq!(change.listener, l.id());
    Ok(())
}

#[tokio::test]
async fn test_meta_events_only_fire_on_actual_changes() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    emitter.on_meta(MetaEvent::ListenerAdded, forward(tx.clone(), MetaEvent::ListenerAdded));
    emitter.on_meta(MetaEvent::ListenerRemoved, forward(tx, MetaEvent::ListenerRemoved));

    let l = Listener::new(|_: u32| async { Ok(()) });
    emitter.on("x", l.clone())?;
    emitter.on("x", l.clone())?;
    emitter.off("x", &l)?;
    emitter.off("x", &l)?;

    assert_eq!(recv(&mut rx).await.0, MetaEvent::ListenerAdded);
    assert_eq!(recv(&mut rx).await.0, MetaEvent::ListenerRemoved);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(rx.try_recv().is_err());
    Ok(())
}

#[tokio::test]
async fn test_meta_events_keep_change_order() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    emitter.on_meta(MetaEvent::ListenerAdded, forward(tx.clone(), MetaEvent::ListenerAdded));
    emitter.on_meta(MetaEvent::ListenerRemoved, forward(tx, MetaEvent::ListenerRemoved));

    let off_a = emitter.on("a", Listener::new(|_| async { Ok(()) }))?;
    off_a.unsubscribe();
    let off_b = emitter.on("b", Listener::new(|_| async { Ok(()) }))?;
    off_b.unsubscribe();

    let mut seen = Vec::new();
    for _ in 0..4 {
        let (kind, change) = recv(&mut rx).await;
        seen.push((kind, change.event));
    }
    assert_eq!(
        seen,
        vec![
            (MetaEvent::ListenerAdded, Some(EventKey::from("a"))),
            (MetaEvent::ListenerRemoved, Some(EventKey::from("a"))),
            (MetaEvent::ListenerAdded, Some(EventKey::from("b"))),
            (MetaEvent::ListenerRemoved, Some(EventKey::from("b"))),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_any_listener_changes_carry_no_key() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    emitter.on_meta(MetaEvent::ListenerAdded, forward(tx, MetaEvent::ListenerAdded));

    emitter.on_any(AnyListener::new(|_, _| async { Ok(()) }));

    let (_, change) = recv(&mut rx).await;
    assert_eq!(change.event, None);
    Ok(())
}

#[tokio::test]
async fn test_clear_announces_each_removal() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    emitter.on_meta(MetaEvent::ListenerRemoved, forward(tx, MetaEvent::ListenerRemoved));

    emitter.on("a", Listener::new(|_| async { Ok(()) }))?;
    emitter.on("b", Listener::new(|_| async { Ok(()) }))?;
    emitter.clear_all();

    let mut keys = vec![recv(&mut rx).await.1.event, recv(&mut rx).await.1.event];
    keys.sort_by_key(|k| k.as_ref().and_then(EventKey::as_name).map(str::to_owned));
    assert_eq!(keys, vec![Some(EventKey::from("a")), Some(EventKey::from("b"))]);
    Ok(())
}

#[tokio::test]
async fn test_meta_listeners_are_not_counted() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    let meta = Listener::new(|_: ListenerChange| async { Ok(()) });
    emitter.on_meta(MetaEvent::ListenerAdded, meta.clone());

    assert_eq!(emitter.count_all(), 0);
    emitter.clear_all();
    emitter.off_meta(MetaEvent::ListenerAdded, &meta);
    Ok(())
}

#[tokio::test]
async fn test_failing_meta_listener_does_not_affect_subscribe() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    emitter.on_meta(
        MetaEvent::ListenerAdded,
        Listener::new(|_| async { Err(ListenerError::fail("meta failed")) }),
    );

    emitter.on("x", Listener::new(|_| async { Ok(()) }))?;
    tokio::task::yield_now().await;
    assert_eq!(emitter.count("x")?, 1);
    Ok(())
}

#[test]
fn test_meta_events_are_skipped_without_runtime() -> Result<(), Error> {
    let emitter: Emitter<u32> = Emitter::new();
    emitter.on_meta(
        MetaEvent::ListenerAdded,
        Listener::new(|_| async { Ok(()) }),
    );

    let off = emitter.on("x", Listener::new(|_| async { Ok(()) }))?;
    off.unsubscribe();
    assert_eq!(emitter.count_all(), 0);
    Ok(())
}

type Records = Arc<Mutex<Vec<(DebugKind, String, Option<EventKey>)>>>;

fn capture(records: &Records) -> DebugLogger {
    let records = Arc::clone(records);
    Arc::new(move |rec: &DebugRecord<'_>| {
        records
            .lock()
            .push((rec.kind, rec.emitter.to_owned(), rec.event.cloned()));
    })
}

#[tokio::test]
async fn test_debug_logger_sees_operations() -> Result<(), Error> {
    let records: Records = Arc::default();
    let emitter: Emitter<u32> = Emitter::builder()
        .name("clock")
        .debug(true)
        .logger(capture(&records))
        .build();

    emitter.on("tick", Listener::new(|_| async { Ok(()) }))?;
    emitter.emit("tick", 1)?.await?;
    emitter.emit_serial("tick", 2)?.await?;
    emitter.clear("tick")?;

    let kinds: Vec<DebugKind> = records.lock().iter().map(|r| r.0).collect();
    assert_eq!(
        kinds,
        vec![
            DebugKind::Subscribe,
            DebugKind::Emit,
            DebugKind::EmitSerial,
            DebugKind::Clear
        ]
    );
    assert!(records
        .lock()
        .iter()
        .all(|r| r.1 == "clock" && r.2 == Some(EventKey::from("tick"))));
    Ok(())
}

#[tokio::test]
async fn test_debug_logger_skips_no_op_subscriptions() -> Result<(), Error> {
    let records: Records = Arc::default();
    let emitter: Emitter<u32> = Emitter::builder()
        .debug(true)
        .logger(capture(&records))
        .build();
    let l = Listener::new(|_: u32| async { Ok(()) });

    emitter.on("tick", l.clone())?;
    emitter.on("tick", l.clone())?;
    emitter.off("tick", &l)?;
    emitter.off("tick", &l)?;

    let kinds: Vec<DebugKind> = records.lock().iter().map(|r| r.0).collect();
    assert_eq!(kinds, vec![DebugKind::Subscribe, DebugKind::Unsubscribe]);
    Ok(())
}

#[tokio::test]
async fn test_debug_logger_silent_when_disabled() -> Result<(), Error> {
    let records: Records = Arc::default();
    let emitter: Emitter<u32> = Emitter::builder().logger(capture(&records)).build();

    emitter.on("tick", Listener::new(|_| async { Ok(()) }))?;
    emitter.emit("tick", 1)?.await?;

    assert!(records.lock().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_panicking_debug_logger_is_contained() -> Result<(), Error> {
    let logger: DebugLogger = Arc::new(|_: &DebugRecord<'_>| panic!("logger exploded"));
    let emitter: Emitter<u32> = Emitter::builder().debug(true).logger(logger).build();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let l = {
        let seen = Arc::clone(&seen);
        Listener::new(move |n: u32| {
            seen.lock().push(n);
            async { Ok(()) }
        })
    };
    emitter.on("tick", l)?;
    emitter.emit("tick", 3)?.await?;

    assert_eq!(*seen.lock(), vec![3]);
    Ok(())
}
