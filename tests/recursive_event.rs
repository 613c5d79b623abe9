//! Scenario 4: recursive (superclass-opt-in) dispatch. `Leaf :<
//! RecursiveBase :< Base`; a listener on `RecursiveBase` runs for a
//! `Leaf` event, one on `Base` does not (the chain stops at the first
//! non-recursive ancestor).

use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dispatch_core::{filter_fn, listener_fn, Event, EventFilter, EventHierarchy, HandlerKey, ListenerOutcome, Node};

#[derive(Debug)]
struct BaseEvent;
#[derive(Debug)]
struct RecursiveBaseEvent;
#[derive(Debug)]
struct LeafEvent;

impl Event for BaseEvent {
    fn class(&self) -> TypeId {
        TypeId::of::<BaseEvent>()
    }
    fn class_name(&self) -> &'static str {
        "BaseEvent"
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}
impl Event for RecursiveBaseEvent {
    fn class(&self) -> TypeId {
        TypeId::of::<RecursiveBaseEvent>()
    }
    fn class_name(&self) -> &'static str {
        "RecursiveBaseEvent"
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}
impl Event for LeafEvent {
    fn class(&self) -> TypeId {
        TypeId::of::<LeafEvent>()
    }
    fn class_name(&self) -> &'static str {
        "LeafEvent"
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct ThreeLevelHierarchy;

impl EventHierarchy for ThreeLevelHierarchy {
    fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        sub == sup
            || (sub == TypeId::of::<LeafEvent>() && sup == TypeId::of::<RecursiveBaseEvent>())
            || (sub == TypeId::of::<RecursiveBaseEvent>() && sup == TypeId::of::<BaseEvent>())
            || (sub == TypeId::of::<LeafEvent>() && sup == TypeId::of::<BaseEvent>())
    }

    fn is_recursive(&self, ty: TypeId) -> bool {
        ty == TypeId::of::<RecursiveBaseEvent>() || ty == TypeId::of::<LeafEvent>()
    }

    fn superclass(&self, ty: TypeId) -> Option<TypeId> {
        if ty == TypeId::of::<LeafEvent>() {
            Some(TypeId::of::<RecursiveBaseEvent>())
        } else if ty == TypeId::of::<RecursiveBaseEvent>() {
            Some(TypeId::of::<BaseEvent>())
        } else {
            None
        }
    }
}

fn base_filter() -> Arc<dyn EventFilter> {
    filter_fn(TypeId::of::<BaseEvent>(), "BaseEvent", |_| HandlerKey::None)
}

#[test]
fn recursive_base_listener_runs_for_leaf_event() {
    let root = Node::builder("root", base_filter())
        .hierarchy(Arc::new(ThreeLevelHierarchy))
        .build();

    let recursive_calls = Arc::new(AtomicUsize::new(0));
    let recursive_calls2 = recursive_calls.clone();
    root.add_listener::<RecursiveBaseEvent>(listener_fn(move |_: &RecursiveBaseEvent| {
        recursive_calls2.fetch_add(1, Ordering::SeqCst);
        ListenerOutcome::Success
    }))
    .unwrap();

    let base_calls = Arc::new(AtomicUsize::new(0));
    let base_calls2 = base_calls.clone();
    root.add_listener::<BaseEvent>(listener_fn(move |_: &BaseEvent| {
        base_calls2.fetch_add(1, Ordering::SeqCst);
        ListenerOutcome::Success
    }))
    .unwrap();

    let handle = root.get_handle::<LeafEvent>().unwrap();
    root.call(&LeafEvent, &handle).unwrap();

    assert_eq!(recursive_calls.load(Ordering::SeqCst), 1);
    assert_eq!(base_calls.load(Ordering::SeqCst), 0, "chain stops at the non-recursive ancestor");
}
