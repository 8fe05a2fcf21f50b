use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use subpub::{Bus, BusError, Config, EventKind, HandlerFn, HandlerRef};
use tokio::sync::mpsc;
use tokio::time::timeout;

fn capture(tx: mpsc::UnboundedSender<String>) -> HandlerRef<String> {
    HandlerFn::arc("capture", move |msg: String| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(msg);
        }
    })
}

fn counter(hits: &Arc<AtomicUsize>) -> HandlerRef<String> {
    let hits = Arc::clone(hits);
    HandlerFn::arc("counter", move |_msg: String| {
        let hits = Arc::clone(&hits);
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
        }
    })
}

#[tokio::test]
async fn delivers_published_message_once() {
    let bus = Bus::new(Config::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let sub = bus.subscribe("test", capture(tx)).expect("subscribe");

    bus.publish("test", "hello".to_string()).await.expect("publish");

    let got = timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timeout")
        .expect("message");
    assert_eq!(got, "hello");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err(), "delivered more than once");
    sub.unsubscribe();
}

#[tokio::test]
async fn unsubscribed_handler_is_never_invoked() {
    let bus = Bus::new(Config::default());
    let hits = Arc::new(AtomicUsize::new(0));
    let sub = bus.subscribe("test", counter(&hits)).expect("subscribe");

    sub.unsubscribe();
    assert!(!sub.is_active());
    bus.publish("test", "hello".to_string()).await.expect("publish");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(bus.subject_count(), 0);
}

#[tokio::test]
async fn publish_after_close_fails() {
    let bus: Bus<String> = Bus::new(Config::default());
    // Nothing queued: the drain finishes well within the deadline.
    bus.close(Duration::from_millis(10)).await.expect("close");

    let err = bus.publish("test", "after close".to_string()).await;
    assert_eq!(err, Err(BusError::Closed));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn every_subscriber_receives_the_message() {
    let bus = Bus::new(Config::default());
    let (tx1, mut rx1) = mpsc::unbounded_channel();
    let (tx2, mut rx2) = mpsc::unbounded_channel();
    let _s1 = bus.subscribe("test", capture(tx1)).expect("s1");
    let _s2 = bus.subscribe("test", capture(tx2)).expect("s2");

    bus.publish("test", "fan-out".to_string()).await.expect("publish");

    for rx in [&mut rx1, &mut rx2] {
        let got = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timeout")
            .expect("message");
        assert_eq!(got, "fan-out");
    }
}

#[tokio::test]
async fn publish_to_unknown_subject_succeeds() {
    let bus = Bus::new(Config::default());
    let mut events = bus.events();
    let hits = Arc::new(AtomicUsize::new(0));
    let _other = bus.subscribe("other", counter(&hits)).expect("subscribe");

    bus.publish("nobody-listens", "x".to_string())
        .await
        .expect("publish");

    let ev = timeout(Duration::from_secs(1), async {
        loop {
            let ev = events.recv().await.expect("event");
            if ev.kind == EventKind::NoSubscribers {
                return ev;
            }
        }
    })
    .await
    .expect("no-subscribers event");
    assert_eq!(ev.subject.as_deref(), Some("nobody-listens"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn close_is_idempotent() {
    let bus: Bus<String> = Bus::new(Config::default());
    assert_eq!(bus.close(Duration::from_secs(1)).await, Ok(()));

    let second = timeout(Duration::from_millis(100), bus.close(Duration::from_secs(10)))
        .await
        .expect("second close must not wait");
    assert_eq!(second, Ok(()));
}

#[tokio::test]
async fn subscribe_after_close_fails() {
    let bus = Bus::new(Config::default());
    bus.shutdown().await.expect("shutdown");

    let hits = Arc::new(AtomicUsize::new(0));
    let err = bus.subscribe("test", counter(&hits)).unwrap_err();
    assert!(err.is_closed());
}

#[tokio::test]
async fn unsubscribe_twice_is_noop() {
    let bus = Bus::new(Config::default());
    let hits = Arc::new(AtomicUsize::new(0));
    let keep = bus.subscribe("test", counter(&hits)).expect("keep");
    let gone = bus.subscribe("test", counter(&hits)).expect("gone");

    gone.unsubscribe();
    gone.unsubscribe();
    assert_eq!(bus.subscriber_count("test"), 1);
    assert!(keep.is_active());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_handler_does_not_delay_others() {
    let bus = Bus::new(Config::default());
    let release = Arc::new(tokio::sync::Notify::new());

    let gate = Arc::clone(&release);
    let _slow = bus
        .subscribe(
            "test",
            HandlerFn::arc("slow", move |_msg: String| {
                let gate = Arc::clone(&gate);
                async move {
                    gate.notified().await;
                }
            }),
        )
        .expect("slow");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _fast = bus.subscribe("test", capture(tx)).expect("fast");

    for i in 0..3 {
        bus.publish("test", format!("m{i}")).await.expect("publish");
    }

    for _ in 0..3 {
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("fast handler starved by slow one")
            .expect("message");
    }
    release.notify_waiters();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_handler_is_isolated() {
    let bus = Bus::new(Config::default());
    let mut events = bus.events();

    let _boom = bus
        .subscribe(
            "test",
            HandlerFn::arc("boom", |_msg: String| async move {
                panic!("handler exploded");
            }),
        )
        .expect("boom");
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _ok = bus.subscribe("test", capture(tx)).expect("ok");

    bus.publish("test", "first".to_string()).await.expect("publish");
    bus.publish("test", "second".to_string()).await.expect("publish");

    let mut got = Vec::new();
    for _ in 0..2 {
        got.push(
            timeout(Duration::from_secs(1), rx.recv())
                .await
                .expect("timeout")
                .expect("message"),
        );
    }
    got.sort();
    assert_eq!(got, vec!["first".to_string(), "second".to_string()]);

    let ev = timeout(Duration::from_secs(1), async {
        loop {
            let ev = events.recv().await.expect("event");
            if ev.is_handler_panic() {
                return ev;
            }
        }
    })
    .await
    .expect("panic event");
    assert_eq!(ev.handler.as_deref(), Some("boom"));
    assert_eq!(ev.reason.as_deref(), Some("handler exploded"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_publishers_all_delivered() {
    let bus: Arc<Bus<String>> = Arc::new(Bus::builder().with_queue_capacity(4).build());
    let hits = Arc::new(AtomicUsize::new(0));
    let _sub = bus.subscribe("load", counter(&hits)).expect("subscribe");

    let mut producers = Vec::new();
    for p in 0..4 {
        let bus = Arc::clone(&bus);
        producers.push(tokio::spawn(async move {
            for i in 0..50 {
                bus.publish("load", format!("{p}-{i}")).await.expect("publish");
            }
        }));
    }
    for p in producers {
        p.await.expect("producer");
    }

    timeout(Duration::from_secs(2), async {
        while hits.load(Ordering::SeqCst) < 200 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("all 200 delivered");
}

#[tokio::test]
async fn close_emits_lifecycle_events() {
    let bus: Bus<String> = Bus::builder().with_log_writer().build();
    let mut events = bus.events();

    bus.close(Duration::from_secs(1)).await.expect("close");
    assert!(bus.is_closed());
    assert!(bus.is_drained());

    let mut kinds = Vec::new();
    while let Ok(ev) = events.try_recv() {
        kinds.push(ev.kind);
    }
    assert!(kinds.contains(&EventKind::CloseRequested));
    assert!(kinds.contains(&EventKind::Drained));
}

#[tokio::test]
async fn requests_leave_queue_in_enqueue_order_across_subjects() {
    let bus: Bus<u32> = Bus::builder().with_queue_capacity(4).build();
    let mut events = bus.events();

    let mut enqueued = Vec::new();
    for i in 0..20_u32 {
        let subject = format!("s{}", i % 3);
        bus.publish(&subject, i).await.expect("publish");
        enqueued.push(subject);
    }
    bus.close(Duration::from_secs(1)).await.expect("close");

    let mut dispatched = Vec::new();
    while let Ok(ev) = events.try_recv() {
        if ev.kind == EventKind::NoSubscribers {
            dispatched.push(ev.subject.as_deref().unwrap_or_default().to_string());
        }
    }
    assert_eq!(dispatched, enqueued);
}
