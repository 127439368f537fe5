//! Event channel implementation using crossbeam-channel.
//!
//! Lets the scheduler and cache push notifications to any UI layer
//! without knowing who, if anyone, is listening.

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use super::Event;

/// Sends events from the core library.
///
/// Cheap to clone; every worker thread holds its own copy.
#[derive(Clone)]
pub struct EventSender {
    inner: Option<Sender<Event>>,
}

impl EventSender {
    /// Wrap a raw crossbeam sender.
    pub fn new(sender: Sender<Event>) -> Self {
        Self {
            inner: Some(sender),
        }
    }

    /// A sender that drops everything.
    pub fn disconnected() -> Self {
        Self { inner: None }
    }

    /// Send an event.
    ///
    /// If the receiver is gone the event is discarded; progress reporting
    /// is always optional.
    pub fn send(&self, event: Event) {
        if let Some(sender) = &self.inner {
            let _ = sender.send(event);
        }
    }
}

impl Default for EventSender {
    fn default() -> Self {
        Self::disconnected()
    }
}

impl std::fmt::Debug for EventSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSender")
            .field("connected", &self.inner.is_some())
            .finish()
    }
}

/// Receives events from the core library.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event arrives or every sender is dropped
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Wait at most `timeout` for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Event> {
        match self.inner.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Iterate until every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }

    /// Everything currently buffered, without blocking
    pub fn drain(&self) -> Vec<Event> {
        self.inner.try_iter().collect()
    }
}

/// Factory for sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Create an unbounded event channel.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (EventSender::new(sender), EventReceiver { inner: receiver })
    }

    /// Create a bounded event channel.
    ///
    /// Senders block when the channel is full, which throttles workers to
    /// the pace of a slow consumer.
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        let (sender, receiver) = bounded(capacity);
        (EventSender::new(sender), EventReceiver { inner: receiver })
    }
}

/// A no-op event sender for tests or headless use.
pub fn null_sender() -> EventSender {
    EventSender::disconnected()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BatchEvent, CacheEvent};
    use std::thread;

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(Event::Batch(BatchEvent::Started {
                job_id: "job-1".into(),
            }));
        });

        handle.join().unwrap();

        match receiver.recv().unwrap() {
            Event::Batch(BatchEvent::Started { job_id }) => assert_eq!(job_id, "job-1"),
            other => panic!("Wrong event type: {:?}", other),
        }
    }

    #[test]
    fn null_sender_does_not_panic() {
        let sender = null_sender();
        sender.send(Event::Cache(CacheEvent::Swept { removed: 0 }));
    }

    #[test]
    fn dropped_receiver_is_ignored() {
        let (sender, receiver) = EventChannel::new();
        drop(receiver);
        sender.send(Event::Cache(CacheEvent::Miss { key: "k".into() }));
    }

    #[test]
    fn drain_returns_buffered_events_in_order() {
        let (sender, receiver) = EventChannel::bounded(4);

        sender.send(Event::Cache(CacheEvent::Miss { key: "a".into() }));
        sender.send(Event::Cache(CacheEvent::Miss { key: "b".into() }));

        let drained = receiver.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], Event::Cache(CacheEvent::Miss { key: "a".into() }));
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn recv_timeout_gives_up() {
        let (_sender, receiver) = EventChannel::new();
        assert!(receiver.recv_timeout(Duration::from_millis(10)).is_none());
    }
}
