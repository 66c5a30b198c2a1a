//! Gesture events and their dispatcher

pub mod dispatcher;

pub use dispatcher::{EventDispatcher, EventType, GestureEvent, ListenerId};
