//! Tests for the Windows interface change source.

use super::*;
use crate::watcher::test_fixtures::Recorder;

#[test]
fn source_default_uses_default_config() {
    let source = WindowsSource::default();
    let debug_str = format!("{source:?}");
    assert!(debug_str.contains("WindowsSource"));
}

#[test]
fn subscribe_succeeds_and_drop_unregisters() {
    let recorder = Recorder::default();
    let subscription = WindowsSource::new(WatcherConfig::default())
        .subscribe(EventSink::new(recorder.clone()))
        .expect("registration should succeed");

    drop(subscription);

    assert_eq!(recorder.failures(), 0);
}

#[test]
fn resubscribe_after_drop() {
    let source = WindowsSource::new(WatcherConfig::default());

    let first = source.subscribe(EventSink::new(|| {})).unwrap();
    drop(first);

    assert!(source.subscribe(EventSink::new(|| {})).is_ok());
}

#[test]
fn subscription_debug() {
    let subscription = WindowsSource::default()
        .subscribe(EventSink::new(|| {}))
        .unwrap();
    let debug_str = format!("{subscription:?}");

    assert!(debug_str.contains("WindowsSubscription"));
    assert!(debug_str.contains("has_handle"));
    assert!(debug_str.contains("has_dispatcher"));
}

#[test]
fn dispatch_raises_one_change_per_message() {
    let recorder = Recorder::default();
    let sink = EventSink::new(recorder.clone());
    let (sender, receiver) = mpsc::channel();

    for _ in 0..3 {
        sender.send(Dispatch::Change).unwrap();
    }
    drop(sender);
    dispatch(&receiver, &sink);

    assert_eq!(recorder.changes(), 3);
}

#[test]
fn dispatch_stops_at_shutdown_message() {
    let recorder = Recorder::default();
    let sink = EventSink::new(recorder.clone());
    let (sender, receiver) = mpsc::channel();

    sender.send(Dispatch::Change).unwrap();
    sender.send(Dispatch::Shutdown).unwrap();
    sender.send(Dispatch::Change).unwrap();
    dispatch(&receiver, &sink);

    // The sender is still alive; only the shutdown message ended the loop.
    assert_eq!(recorder.changes(), 1);
    drop(sender);
}

#[test]
fn drop_releases_dispatcher_while_callback_sender_is_leaked() {
    let recorder = Recorder::default();
    let sink = EventSink::new(recorder.clone());
    let (sender, receiver) = mpsc::channel();
    // Stands in for the sender held by a context whose cancellation failed.
    let leaked = sender.clone();
    let dispatcher = thread::spawn(move || dispatch(&receiver, &sink));

    leaked.send(Dispatch::Change).unwrap();
    let subscription = WindowsSubscription {
        handle: None,
        shutdown: sender,
        dispatcher: Some(dispatcher),
    };
    drop(subscription);

    assert_eq!(recorder.changes(), 1);
    assert!(leaked.send(Dispatch::Change).is_err());
}

#[test]
fn subscription_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<WindowsSubscription>();
}
