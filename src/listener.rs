//! ListenerEntry: per-node, per-event-class bag of direct listeners and
//! binding consumers.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::event::{Event, ListenerOutcome};

/// A type-erased listener, downcasting back to its concrete event type
/// internally. Identity for removal purposes is the `Arc` pointer,
/// exposed through [`ListenerHandle`].
pub trait ErasedListener: Send + Sync {
    fn event_type(&self) -> TypeId;
    fn run(&self, event: &dyn Event) -> ListenerOutcome;
}

struct TypedListener<E, F> {
    event_type: TypeId,
    f: F,
    _marker: std::marker::PhantomData<fn(&E)>,
}

impl<E, F> ErasedListener for TypedListener<E, F>
where
    E: Event + 'static,
    F: Fn(&E) -> ListenerOutcome + Send + Sync,
{
    fn event_type(&self) -> TypeId {
        self.event_type
    }

    fn run(&self, event: &dyn Event) -> ListenerOutcome {
        match event.as_any().downcast_ref::<E>() {
            Some(typed) => (self.f)(typed),
            // The event didn't match this listener's type. The core only
            // ever calls `run` for event types that were looked up under
            // this exact `event_type`, so this branch should not be
            // reachable in practice; treat it as a no-op rather than a
            // panic.
            None => ListenerOutcome::Invalid,
        }
    }
}

/// Wraps a closure into an [`ErasedListener`], ready to hand to
/// [`crate::Node::add_listener`].
pub fn listener_fn<E, F>(f: F) -> Arc<dyn ErasedListener>
where
    E: Event + 'static,
    F: Fn(&E) -> ListenerOutcome + Send + Sync + 'static,
{
    Arc::new(TypedListener {
        event_type: TypeId::of::<E>(),
        f,
        _marker: std::marker::PhantomData,
    })
}

/// An opaque token identifying a registered listener, returned by
/// [`crate::Node::add_listener`] and consumed by
/// [`crate::Node::remove_listener`]. Comparison is by `Arc` pointer
/// identity, mirroring the source's comparison of listener object
/// references.
#[derive(Clone)]
pub struct ListenerHandle {
    pub(crate) event_type: TypeId,
    pub(crate) listener: Arc<dyn ErasedListener>,
}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("event_type", &self.event_type)
            .finish()
    }
}

impl PartialEq for ListenerHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.listener, &other.listener)
    }
}
impl Eq for ListenerHandle {}

/// A type-erased consumer registered in bulk via an [`EventBinding`].
pub trait ErasedConsumer: Send + Sync {
    fn call(&self, event: &dyn Event);
}

struct TypedConsumer<E, F> {
    f: F,
    _marker: std::marker::PhantomData<fn(&E)>,
}

impl<E, F> ErasedConsumer for TypedConsumer<E, F>
where
    E: Event + 'static,
    F: Fn(&E) + Send + Sync,
{
    fn call(&self, event: &dyn Event) {
        if let Some(typed) = event.as_any().downcast_ref::<E>() {
            (self.f)(typed);
        }
    }
}

pub fn consumer_fn<E, F>(f: F) -> Arc<dyn ErasedConsumer>
where
    E: Event + 'static,
    F: Fn(&E) + Send + Sync + 'static,
{
    Arc::new(TypedConsumer {
        f,
        _marker: std::marker::PhantomData,
    })
}

/// A bulk registration that emits one consumer per event type it covers.
///
/// `consumer(type)` must be stable across repeated calls for the same
/// binding and type: the erased consumer it returns is the identity used
/// for deduplication and later removal.
pub trait EventBinding: Send + Sync {
    /// The event types this binding wants to observe.
    fn event_types(&self) -> Vec<TypeId>;

    /// The consumer for a given event type, or `None` if this binding
    /// doesn't cover it.
    fn consumer(&self, event_type: TypeId) -> Option<Arc<dyn ErasedConsumer>>;
}

/// Per-(node, event-class) storage: direct listeners in insertion order,
/// plus binding consumers deduplicated by identity.
#[derive(Default)]
pub struct ListenerEntry {
    pub(crate) listeners: Vec<Arc<dyn ErasedListener>>,
    pub(crate) binding_consumers: Vec<Arc<dyn ErasedConsumer>>,
}

impl ListenerEntry {
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty() && self.binding_consumers.is_empty()
    }

    /// Appends a listener; returns `false` if it was already the entry's
    /// last-inserted instance under this exact identity (idempotence is
    /// enforced by the caller, which dedups against the whole entry).
    pub(crate) fn add_listener(&mut self, listener: Arc<dyn ErasedListener>) -> bool {
        if self
            .listeners
            .iter()
            .any(|existing| Arc::ptr_eq(existing, &listener))
        {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    pub(crate) fn remove_listener(&mut self, listener: &Arc<dyn ErasedListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|existing| !Arc::ptr_eq(existing, listener));
        self.listeners.len() != before
    }

    pub(crate) fn add_consumer(&mut self, consumer: Arc<dyn ErasedConsumer>) -> bool {
        if self
            .binding_consumers
            .iter()
            .any(|existing| Arc::ptr_eq(existing, &consumer))
        {
            return false;
        }
        self.binding_consumers.push(consumer);
        true
    }

    pub(crate) fn remove_consumer(&mut self, consumer: &Arc<dyn ErasedConsumer>) -> bool {
        let before = self.binding_consumers.len();
        self.binding_consumers
            .retain(|existing| !Arc::ptr_eq(existing, consumer));
        self.binding_consumers.len() != before
    }
}
