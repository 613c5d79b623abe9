//! Shared fixtures for the integration tests: one concrete event type
//! routed by player id, plus a reporter that records rather than logs.

use std::any::{Any, TypeId};
use std::sync::{Arc, Mutex};

use dispatch_core::{filter_fn, Event, EventFilter, ExceptionReporter, HandlerKey};

#[derive(Debug, Clone)]
pub struct EventA {
    pub player_id: String,
}

impl Event for EventA {
    fn class(&self) -> TypeId {
        TypeId::of::<EventA>()
    }
    fn class_name(&self) -> &'static str {
        "EventA"
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn event_a_filter() -> Arc<dyn EventFilter> {
    filter_fn(TypeId::of::<EventA>(), "EventA", |event| {
        event
            .as_any()
            .downcast_ref::<EventA>()
            .map(|e| HandlerKey::from(e.player_id.clone()))
            .unwrap_or(HandlerKey::None)
    })
}

/// An unrelated event type, disjoint from `EventA`, used to exercise
/// `TypeMismatch` (a node built for `EventB` must reject `EventA`
/// listeners, handles, and children, and vice versa).
#[derive(Debug, Clone)]
pub struct EventB;

impl Event for EventB {
    fn class(&self) -> TypeId {
        TypeId::of::<EventB>()
    }
    fn class_name(&self) -> &'static str {
        "EventB"
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn event_b_filter() -> Arc<dyn EventFilter> {
    filter_fn(TypeId::of::<EventB>(), "EventB", |_| HandlerKey::None)
}

#[derive(Default)]
pub struct RecordingExceptionReporter {
    pub messages: Mutex<Vec<(String, String, String)>>,
}

impl ExceptionReporter for RecordingExceptionReporter {
    fn report(&self, node_name: &str, event_type_name: &str, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((node_name.to_string(), event_type_name.to_string(), message.to_string()));
    }
}
