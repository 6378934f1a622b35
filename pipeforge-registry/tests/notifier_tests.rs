use pipeforge_registry::{ChangeNotifier, StateSignal};
use std::sync::{Arc, Mutex};

#[test]
fn listeners_run_in_subscription_order() {
    let mut notifier = ChangeNotifier::<u32>::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    for name in ["first", "second", "third"] {
        let log = Arc::clone(&log);
        notifier.subscribe(move |value: &u32| log.lock().unwrap().push(format!("{name}:{value}")));
    }

    notifier.notify(&7);
    assert_eq!(*log.lock().unwrap(), vec!["first:7", "second:7", "third:7"]);
}

#[test]
fn unsubscribe_stops_delivery() {
    let mut notifier = ChangeNotifier::<u32>::new();
    let count = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&count);
    let id = notifier.subscribe(move |_| *sink.lock().unwrap() += 1);

    notifier.notify(&1);
    assert!(notifier.unsubscribe(id));
    notifier.notify(&2);

    assert_eq!(*count.lock().unwrap(), 1);
    assert_eq!(notifier.subscriber_count(), 0);
}

#[test]
fn unsubscribe_unknown_returns_false() {
    let mut notifier = ChangeNotifier::<u32>::new();
    let id = notifier.subscribe(|_| {});
    assert!(notifier.unsubscribe(id));
    assert!(!notifier.unsubscribe(id));
}

#[test]
fn state_signal_take_clears() {
    let signal = StateSignal::new();
    assert!(!signal.take());
    signal.raise();
    assert!(signal.is_raised());
    assert!(signal.take());
    assert!(!signal.is_raised());
}

#[test]
fn state_signal_clones_share_state() {
    let signal = StateSignal::new();
    let remote = signal.clone();
    remote.raise();
    assert!(signal.take());
    assert!(!remote.is_raised());
}
