//! In-process publish/subscribe for engine state changes.
//!
//! One variant per event kind, each carrying a typed snapshot payload, so
//! consumers never parse stringly-typed topic names. Dispatch is synchronous
//! and ordered by subscription; a panicking subscriber is isolated and the
//! remaining subscribers still run.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, warn};

use trainer_core::model::{Progress, Session};

use crate::engine::EngineSnapshot;
use crate::guard::Route;

/// Why a flame-count change was broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlamesReason {
    SessionEnd,
    DailyReset,
}

/// A state change broadcast by the engine. Payloads are clones; handlers
/// can never mutate engine state through them.
#[derive(Debug, Clone)]
pub enum Event {
    Ready(EngineSnapshot),
    StateUpdated(EngineSnapshot),
    RouteChanged(Route),
    SessionStarted(Session),
    SessionFinished(Session),
    SessionReset,
    ProgressUpdated(Progress),
    FlamesUpdated { flames: u32, reason: FlamesReason },
}

impl Event {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Ready(_) => EventKind::Ready,
            Event::StateUpdated(_) => EventKind::StateUpdated,
            Event::RouteChanged(_) => EventKind::RouteChanged,
            Event::SessionStarted(_) => EventKind::SessionStarted,
            Event::SessionFinished(_) => EventKind::SessionFinished,
            Event::SessionReset => EventKind::SessionReset,
            Event::ProgressUpdated(_) => EventKind::ProgressUpdated,
            Event::FlamesUpdated { .. } => EventKind::FlamesUpdated,
        }
    }
}

/// Payload-free discriminant used to filter subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    StateUpdated,
    RouteChanged,
    SessionStarted,
    SessionFinished,
    SessionReset,
    ProgressUpdated,
    FlamesUpdated,
}

/// Handle returned by `subscribe`; pass back to `unsubscribe` to detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    filter: Option<EventKind>,
    handler: Box<dyn FnMut(&Event) + Send>,
}

/// Ordered, synchronous event dispatcher.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for one event kind. Handlers run in subscription order.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&Event) + Send + 'static,
    ) -> SubscriptionId {
        self.attach(Some(kind), Box::new(handler))
    }

    /// Listen for every event.
    pub fn subscribe_all(&mut self, handler: impl FnMut(&Event) + Send + 'static) -> SubscriptionId {
        self.attach(None, Box::new(handler))
    }

    fn attach(
        &mut self,
        filter: Option<EventKind>,
        handler: Box<dyn FnMut(&Event) + Send>,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(Subscriber {
            id,
            filter,
            handler,
        });
        id
    }

    /// Detach a subscription. Returns false if the id was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Dispatch an event to every matching subscriber, in order. A panic in
    /// one handler is caught and logged; the emission loop continues.
    pub fn emit(&mut self, event: &Event) {
        debug!(kind = ?event.kind(), "event emitted");
        for subscriber in &mut self.subscribers {
            if subscriber
                .filter
                .is_some_and(|kind| kind != event.kind())
            {
                continue;
            }
            let handler = &mut subscriber.handler;
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                warn!(kind = ?event.kind(), "event handler panicked; continuing dispatch");
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn record(
        into: &Arc<Mutex<Vec<&'static str>>>,
        tag: &'static str,
    ) -> impl FnMut(&Event) + Send + 'static {
        let into = Arc::clone(into);
        move |_| into.lock().unwrap().push(tag)
    }

    #[test]
    fn dispatch_follows_subscription_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.subscribe(EventKind::SessionReset, record(&seen, "first"));
        bus.subscribe_all(record(&seen, "second"));
        bus.subscribe(EventKind::SessionReset, record(&seen, "third"));

        bus.emit(&Event::SessionReset);
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn filter_skips_other_kinds() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.subscribe(EventKind::ProgressUpdated, record(&seen, "progress"));

        bus.emit(&Event::SessionReset);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn panicking_handler_does_not_stop_dispatch() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.subscribe_all(|_| panic!("boom"));
        bus.subscribe_all(record(&seen, "after"));

        bus.emit(&Event::SessionReset);
        assert_eq!(*seen.lock().unwrap(), vec!["after"]);

        // Bus still usable afterwards.
        bus.emit(&Event::SessionReset);
        assert_eq!(*seen.lock().unwrap(), vec!["after", "after"]);
    }

    #[test]
    fn unsubscribe_detaches_handler() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        let id = bus.subscribe_all(record(&seen, "gone"));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));

        bus.emit(&Event::SessionReset);
        assert!(seen.lock().unwrap().is_empty());
    }
}
