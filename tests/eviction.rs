use progresscast::{
    EventKind, Handler, HandlerConfig, ListenerState, ProgressBarId, ProgressSnapshot,
    TaggedUpdate,
};

fn update(count: u64) -> TaggedUpdate {
    let mut snapshot = ProgressSnapshot::empty(None);
    snapshot.count = count;
    TaggedUpdate::new(ProgressBarId::new(), snapshot)
}

#[test]
fn undrained_listener_is_evicted_after_overflow() {
    let handler = Handler::new(HandlerConfig::default().with_queue_capacity(2)).unwrap();
    let mut events = handler.events();
    let mut listener = handler.listen();

    handler.announce(update(1));
    handler.announce(update(2));
    assert!(listener.is_active());

    handler.announce(update(3));
    assert_eq!(listener.state(), ListenerState::Evicted);

    // Announcing after the eviction must not fail nor reach the evicted queue.
    assert_eq!(handler.announce(update(4)), 0);

    let stats = handler.stats();
    assert_eq!(stats.evicted, 1);
    assert_eq!(stats.listeners, 0);

    let counts: Vec<u64> = listener.drain().iter().map(|u| u.format.count).collect();
    assert_eq!(counts, vec![1, 2]);
    assert!(!handler.unsubscribe(&listener));

    let evicted = std::iter::from_fn(|| events.try_recv().ok())
        .find(|ev| ev.kind == EventKind::ListenerEvicted)
        .unwrap();
    assert_eq!(evicted.listener, Some(listener.id()));
}

#[test]
fn listening_again_resumes_delivery() {
    let handler = Handler::new(HandlerConfig::default().with_queue_capacity(1)).unwrap();
    let first = handler.listen();
    handler.announce(update(1));
    handler.announce(update(2));
    assert_eq!(first.state(), ListenerState::Evicted);

    let mut second = handler.listen();
    assert_eq!(handler.announce(update(3)), 1);
    assert_eq!(second.try_recv().unwrap().format.count, 3);
}

#[test]
fn draining_listener_is_never_evicted() {
    let handler = Handler::new(HandlerConfig::default().with_queue_capacity(2)).unwrap();
    let mut listener = handler.listen();

    for count in 0..100 {
        handler.announce(update(count));
        assert_eq!(listener.try_recv().unwrap().format.count, count);
    }
    assert!(listener.is_active());
    assert_eq!(handler.stats().delivered, 100);
}
