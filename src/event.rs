//! Event trait and the external collaborators the dispatch tree consumes
//!
//! Everything in this module is a narrow interface: the tree itself never
//! constructs concrete events, never decides what is a superclass of what,
//! and never knows how a routing key is shaped beyond [`HandlerKey`]. Those
//! decisions belong to whoever builds a concrete event hierarchy on top of
//! this crate.

use std::any::{Any, TypeId};
use std::fmt::Debug;
use std::sync::Arc;

/// Base trait for all events flowing through the dispatch tree.
///
/// Concrete event types implement this directly; the tree only ever holds
/// `&dyn Event` and downcasts through [`Event::as_any`] when a listener
/// needs its concrete type back.
pub trait Event: Debug + Any + Send + Sync {
    /// The runtime class of this event, used as the lookup key into a
    /// node's listener entries and handle table.
    fn class(&self) -> TypeId;

    /// Human-readable name for the event's class, used in logging only.
    fn class_name(&self) -> &'static str;

    /// Convert to `&dyn Any` so listeners can downcast back to their
    /// concrete event type.
    fn as_any(&self) -> &dyn Any;
}

/// Outcome of invoking a single listener.
///
/// Mirrors the four-way result a Minestom-style listener can produce;
/// `Exception` and `Expired` both carry dispatch-side bookkeeping
/// (reporting and self-removal respectively) but never propagate as a
/// `Result` to the caller of [`crate::Node::call`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerOutcome {
    /// The listener ran to completion normally.
    Success,
    /// The listener declined to act on this event (no-op, not an error).
    Invalid,
    /// The listener is done; remove it before the next dispatch.
    Expired,
    /// The listener panicked-equivalent; reported and otherwise ignored.
    Exception,
}

/// The routing key a [`crate::EventFilter`] extracts from an event.
///
/// The original design allows an arbitrary key object (a player, a block
/// position, an instance). A statically typed port can't erase over an
/// open set of key types without a trait-object key (`Hash + Eq` dyn
/// objects are awkward in Rust), so this crate closes the set to the
/// handful of primitive shapes a routing key realistically takes. See
/// `DESIGN.md` for the rationale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandlerKey {
    Str(Arc<str>),
    U64(u64),
    I64(i64),
    Bool(bool),
    /// No key could be extracted (event doesn't carry the routed field).
    None,
}

impl From<&str> for HandlerKey {
    fn from(s: &str) -> Self {
        HandlerKey::Str(Arc::from(s))
    }
}

impl From<String> for HandlerKey {
    fn from(s: String) -> Self {
        HandlerKey::Str(Arc::from(s.as_str()))
    }
}

impl From<u64> for HandlerKey {
    fn from(v: u64) -> Self {
        HandlerKey::U64(v)
    }
}

impl From<i64> for HandlerKey {
    fn from(v: i64) -> Self {
        HandlerKey::I64(v)
    }
}

impl From<bool> for HandlerKey {
    fn from(v: bool) -> Self {
        HandlerKey::Bool(v)
    }
}

/// External collaborator describing how event classes relate to one
/// another: subtyping and opt-in recursive (superclass) dispatch.
///
/// The core never inspects an event's inheritance directly; it always
/// goes through a hierarchy instance supplied at node construction.
pub trait EventHierarchy: Send + Sync {
    /// Is `sub` the same type as, or transitively derived from, `sup`?
    fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool;

    /// Does `ty` opt into recursive (superclass) dispatch?
    fn is_recursive(&self, ty: TypeId) -> bool;

    /// The immediate recursive superclass of `ty`, if any. Only consulted
    /// when `is_recursive(ty)` is true.
    fn superclass(&self, ty: TypeId) -> Option<TypeId>;
}

/// The default hierarchy: every type is only a subtype of itself and
/// nothing opts into recursive dispatch. Suitable when a consumer has a
/// flat event set with no superclass relationships.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlatHierarchy;

impl EventHierarchy for FlatHierarchy {
    fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        sub == sup
    }

    fn is_recursive(&self, _ty: TypeId) -> bool {
        false
    }

    fn superclass(&self, _ty: TypeId) -> Option<TypeId> {
        None
    }
}
