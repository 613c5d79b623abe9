//! Filter & Predicate: the node-scoped key extractor and dispatch-time gate.

use std::any::TypeId;
use std::sync::Arc;

use crate::event::{Event, HandlerKey};

/// Extracts a routing key from any event of a node's base type, and
/// reports the base type itself (used to restrict which children may
/// attach, per invariant 2).
pub trait EventFilter: Send + Sync {
    /// The base event class this filter accepts.
    fn target_type(&self) -> TypeId;

    /// Human-readable name for the target type, for logging only.
    fn target_type_name(&self) -> &'static str;

    /// Pull the routing key out of an event of the target type.
    fn extract_key(&self, event: &dyn Event) -> HandlerKey;
}

/// A per-node gate applied at dispatch time, after a listener's event
/// type has already matched. Returning `false` skips the listener
/// without counting as a removal or an error.
pub trait Predicate: Send + Sync {
    fn test(&self, event: &dyn Event, key: &HandlerKey) -> bool;
}

/// Adapts a plain closure into an [`EventFilter`], the common case where
/// a filter is "extract this one field" rather than a stateful object.
pub struct FnFilter<F> {
    target_type: TypeId,
    target_type_name: &'static str,
    extract: F,
}

impl<F> FnFilter<F>
where
    F: Fn(&dyn Event) -> HandlerKey + Send + Sync,
{
    pub fn new(target_type: TypeId, target_type_name: &'static str, extract: F) -> Self {
        Self {
            target_type,
            target_type_name,
            extract,
        }
    }
}

impl<F> EventFilter for FnFilter<F>
where
    F: Fn(&dyn Event) -> HandlerKey + Send + Sync,
{
    fn target_type(&self) -> TypeId {
        self.target_type
    }

    fn target_type_name(&self) -> &'static str {
        self.target_type_name
    }

    fn extract_key(&self, event: &dyn Event) -> HandlerKey {
        (self.extract)(event)
    }
}

/// Adapts a plain closure into a [`Predicate`].
pub struct FnPredicate<F> {
    test: F,
}

impl<F> FnPredicate<F>
where
    F: Fn(&dyn Event, &HandlerKey) -> bool + Send + Sync,
{
    pub fn new(test: F) -> Self {
        Self { test }
    }
}

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&dyn Event, &HandlerKey) -> bool + Send + Sync,
{
    fn test(&self, event: &dyn Event, key: &HandlerKey) -> bool {
        (self.test)(event, key)
    }
}

/// Convenience constructor mirroring the other `Arc<dyn ...>` helpers in
/// this crate.
pub fn filter_fn<F>(
    target_type: TypeId,
    target_type_name: &'static str,
    extract: F,
) -> Arc<dyn EventFilter>
where
    F: Fn(&dyn Event) -> HandlerKey + Send + Sync + 'static,
{
    Arc::new(FnFilter::new(target_type, target_type_name, extract))
}

pub fn predicate_fn<F>(test: F) -> Arc<dyn Predicate>
where
    F: Fn(&dyn Event, &HandlerKey) -> bool + Send + Sync + 'static,
{
    Arc::new(FnPredicate::new(test))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    #[derive(Debug)]
    struct Dummy;

    impl Event for Dummy {
        fn class(&self) -> TypeId {
            TypeId::of::<Dummy>()
        }
        fn class_name(&self) -> &'static str {
            "Dummy"
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn fn_filter_reports_its_target_type_and_extracts_a_key() {
        let filter = filter_fn(TypeId::of::<Dummy>(), "Dummy", |_| HandlerKey::from(7u64));
        assert_eq!(filter.target_type(), TypeId::of::<Dummy>());
        assert_eq!(filter.target_type_name(), "Dummy");
        assert_eq!(filter.extract_key(&Dummy), HandlerKey::U64(7));
    }

    #[test]
    fn fn_predicate_gates_on_the_extracted_key() {
        let predicate = predicate_fn(|_event, key| matches!(key, HandlerKey::U64(n) if *n == 7));
        assert!(predicate.test(&Dummy, &HandlerKey::U64(7)));
        assert!(!predicate.test(&Dummy, &HandlerKey::U64(8)));
    }
}
