//! Synchronous observer registry
//!
//! Handlers run on the dispatching thread in registration order. The
//! registry is shared between clones, so a handler can hold a dispatcher
//! handle and add or remove listeners (itself included) while being called.

use crate::recognition::classifier::PoseTag;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc;
use std::sync::Arc;

/// Event names a controller emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Gesture,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gesture => "gesture",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a `gesture` event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub pose: PoseTag,
}

/// Handle returned by `add_listener`, used to remove it again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Handler = Arc<dyn Fn(&GestureEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(EventType, ListenerId, Handler)>,
}

/// Cloneable handle to a shared listener registry
#[derive(Clone, Default)]
pub struct EventDispatcher {
    registry: Arc<Mutex<Registry>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener<F>(&self, event_type: EventType, handler: F) -> ListenerId
    where
        F: Fn(&GestureEvent) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.listeners.push((event_type, id, Arc::new(handler)));
        tracing::debug!("Added {} listener {:?}", event_type, id);
        id
    }

    /// Returns whether the listener was registered
    pub fn remove_listener(&self, event_type: EventType, id: ListenerId) -> bool {
        let mut registry = self.registry.lock();
        let before = registry.listeners.len();
        registry
            .listeners
            .retain(|(ty, listener, _)| !(*ty == event_type && *listener == id));
        let removed = registry.listeners.len() != before;
        if removed {
            tracing::debug!("Removed {} listener {:?}", event_type, id);
        }
        removed
    }

    /// Call every listener for `event_type` with `event`.
    ///
    /// Listeners are snapshotted first and the lock released, so changes
    /// made by a handler apply from the next dispatch on.
    pub fn dispatch(&self, event_type: EventType, event: &GestureEvent) {
        let handlers: Vec<Handler> = {
            let registry = self.registry.lock();
            registry
                .listeners
                .iter()
                .filter(|(ty, _, _)| *ty == event_type)
                .map(|(_, _, handler)| Arc::clone(handler))
                .collect()
        };

        for handler in handlers {
            handler(event);
        }
    }

    /// Forward events to a channel for consumers polling on another thread
    pub fn subscribe(&self, event_type: EventType) -> (ListenerId, mpsc::Receiver<GestureEvent>) {
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        let id = self.add_listener(event_type, move |event| {
            if tx.lock().send(*event).is_err() {
                tracing::trace!("Subscriber gone, dropping {:?}", event.pose);
            }
        });
        (id, rx)
    }

    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.registry
            .lock()
            .listeners
            .iter()
            .filter(|(ty, _, _)| *ty == event_type)
            .count()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.registry.lock().listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(pose: PoseTag) -> GestureEvent {
        GestureEvent { pose }
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        let dispatcher = EventDispatcher::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let calls = Arc::clone(&calls);
            dispatcher.add_listener(EventType::Gesture, move |e| {
                calls.lock().push((name, e.pose));
            });
        }

        dispatcher.dispatch(EventType::Gesture, &event(PoseTag::Fist));
        assert_eq!(
            *calls.lock(),
            vec![
                ("first", PoseTag::Fist),
                ("second", PoseTag::Fist),
                ("third", PoseTag::Fist)
            ]
        );
    }

    #[test]
    fn test_remove_listener() {
        let dispatcher = EventDispatcher::new();
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        let id = dispatcher.add_listener(EventType::Gesture, move |_| *counter.lock() += 1);

        dispatcher.dispatch(EventType::Gesture, &event(PoseTag::Victory));
        assert!(dispatcher.remove_listener(EventType::Gesture, id));
        assert!(!dispatcher.remove_listener(EventType::Gesture, id));
        dispatcher.dispatch(EventType::Gesture, &event(PoseTag::Victory));

        assert_eq!(*count.lock(), 1);
        assert_eq!(dispatcher.listener_count(EventType::Gesture), 0);
    }

    #[test]
    fn test_self_removal_during_dispatch() {
        let dispatcher = EventDispatcher::new();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let own_id = Arc::new(Mutex::new(None));

        let handle = dispatcher.clone();
        let (log, slot) = (Arc::clone(&calls), Arc::clone(&own_id));
        let id = dispatcher.add_listener(EventType::Gesture, move |_| {
            log.lock().push("once");
            if let Some(id) = *slot.lock() {
                handle.remove_listener(EventType::Gesture, id);
            }
        });
        *own_id.lock() = Some(id);

        let log = Arc::clone(&calls);
        dispatcher.add_listener(EventType::Gesture, move |_| log.lock().push("always"));

        dispatcher.dispatch(EventType::Gesture, &event(PoseTag::OneFinger));
        dispatcher.dispatch(EventType::Gesture, &event(PoseTag::OneFinger));

        // The later listener still ran in the pass where the first removed itself
        assert_eq!(*calls.lock(), vec!["once", "always", "always"]);
    }

    #[test]
    fn test_listener_added_during_dispatch_waits_for_next_pass() {
        let dispatcher = EventDispatcher::new();
        let calls = Arc::new(Mutex::new(0));

        let handle = dispatcher.clone();
        let counter = Arc::clone(&calls);
        dispatcher.add_listener(EventType::Gesture, move |_| {
            let counter = Arc::clone(&counter);
            handle.add_listener(EventType::Gesture, move |_| *counter.lock() += 1);
        });

        dispatcher.dispatch(EventType::Gesture, &event(PoseTag::Restore));
        assert_eq!(*calls.lock(), 0);
        dispatcher.dispatch(EventType::Gesture, &event(PoseTag::Restore));
        assert_eq!(*calls.lock(), 1);
    }

    #[test]
    fn test_subscribe_forwards_to_channel() {
        let dispatcher = EventDispatcher::new();
        let (id, rx) = dispatcher.subscribe(EventType::Gesture);

        dispatcher.dispatch(EventType::Gesture, &event(PoseTag::LShape));
        dispatcher.dispatch(EventType::Gesture, &event(PoseTag::PhotoNext));

        let received: Vec<PoseTag> = rx.try_iter().map(|e| e.pose).collect();
        assert_eq!(received, vec![PoseTag::LShape, PoseTag::PhotoNext]);

        assert!(dispatcher.remove_listener(EventType::Gesture, id));
        drop(rx);
        // A dropped receiver is not an error for the dispatcher
        dispatcher.dispatch(EventType::Gesture, &event(PoseTag::Fist));
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_string(&event(PoseTag::TwoFingers)).unwrap();
        assert_eq!(json, r#"{"pose":"two_fingers"}"#);
        assert_eq!(EventType::Gesture.to_string(), "gesture");
    }
}
