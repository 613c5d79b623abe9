//! Handle: the per-(node, event-class) cache of the flattened listener
//! sequence that dispatch actually walks.

use std::any::TypeId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::event::{Event, HandlerKey, ListenerOutcome};
use crate::filter::{EventFilter, Predicate as _};
use crate::listener::{ErasedConsumer, ErasedListener};
use crate::logging;
use crate::node::{self, NodeInner};
use crate::typewalk;

/// One entry in a Handle's flattened dispatch sequence, in the order
/// produced by [`Handle::ensure_valid`]'s tree walk (invariant 5:
/// pre-order, priority-ascending among siblings).
enum FlattenedEntry {
    /// A direct listener on `node` (or one of its recursive-superclass
    /// type buckets).
    Listener {
        node: Weak<NodeInner>,
        listener: Arc<dyn ErasedListener>,
    },
    /// A consumer contributed by a bulk `EventBinding`.
    Binding { consumer: Arc<dyn ErasedConsumer> },
    /// A single router standing in for every mapped child whose base
    /// type admits this Handle's event type and whose subtree has at
    /// least one listener for it.
    Router {
        owner: Weak<NodeInner>,
        routes: Vec<(Arc<dyn EventFilter>, Weak<NodeInner>)>,
        event_type: TypeId,
        event_type_name: &'static str,
    },
}

/// Caches the flattened listener sequence for one (node, event-class)
/// pair. Invalidated by any structural edit that could change that
/// sequence; rebuilt lazily, under the structural lock, on the next
/// access.
pub struct Handle {
    owner: Weak<NodeInner>,
    event_type: TypeId,
    event_type_name: &'static str,
    valid: AtomicBool,
    flattened: RwLock<Arc<Vec<FlattenedEntry>>>,
}

impl Handle {
    pub(crate) fn new(
        owner: Weak<NodeInner>,
        event_type: TypeId,
        event_type_name: &'static str,
    ) -> Self {
        Self {
            owner,
            event_type,
            event_type_name,
            valid: AtomicBool::new(false),
            flattened: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub(crate) fn event_type_name(&self) -> &'static str {
        self.event_type_name
    }

    pub(crate) fn owned_by(&self, node: &Arc<NodeInner>) -> bool {
        self.owner
            .upgrade()
            .is_some_and(|owner| Arc::ptr_eq(&owner, node))
    }

    pub(crate) fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.flattened.read().is_empty()
    }

    /// Rebuilds the flattened sequence if invalidated. No lock is taken
    /// when already valid — the wait-free dispatch fast path.
    pub(crate) fn ensure_valid(&self) {
        if self.valid.load(Ordering::Acquire) {
            return;
        }
        let _guard = node::lock_structural();
        // Someone else may have rebuilt this handle while we waited for
        // the lock.
        if self.valid.load(Ordering::Acquire) {
            return;
        }
        let Some(owner) = self.owner.upgrade() else {
            *self.flattened.write() = Arc::new(Vec::new());
            self.valid.store(true, Ordering::Release);
            return;
        };

        let mut entries = Vec::new();
        recursive_update(&owner, self.event_type, self.event_type_name, &mut entries);
        logging::handle_logger().trace(&format!(
            "rebuilt handle for '{}' on '{}': {} entries",
            self.event_type_name,
            owner.name,
            entries.len()
        ));
        *self.flattened.write() = Arc::new(entries);
        self.valid.store(true, Ordering::Release);
    }

    /// Runs every entry of the flattened sequence against `event`, in
    /// order. Does not itself take the structural lock; `Expired` and
    /// structural side effects re-acquire it as needed.
    pub(crate) fn dispatch(&self, event: &dyn Event) {
        let snapshot = self.flattened.read().clone();
        for entry in snapshot.iter() {
            match entry {
                FlattenedEntry::Listener { node, listener } => {
                    dispatch_listener(node, listener, event);
                }
                FlattenedEntry::Binding { consumer } => {
                    consumer.call(event);
                }
                FlattenedEntry::Router {
                    owner,
                    routes,
                    event_type,
                    event_type_name,
                } => {
                    dispatch_router(owner, routes, *event_type, *event_type_name, event);
                }
            }
        }
    }
}

fn dispatch_listener(node: &Weak<NodeInner>, listener: &Arc<dyn ErasedListener>, event: &dyn Event) {
    let Some(node) = node.upgrade() else { return };

    if let Some(predicate) = &node.predicate {
        let key = node.filter.extract_key(event);
        if !predicate.test(event, &key) {
            return;
        }
    }

    match listener.run(event) {
        ListenerOutcome::Exception => {
            node.reporter
                .report(&node.name, event.class_name(), "listener returned Exception");
        }
        ListenerOutcome::Expired => {
            let _guard = node::lock_structural();
            let removed = node
                .listener_entries
                .lock()
                .get_mut(&listener.event_type())
                .map(|entry| entry.remove_listener(listener))
                .unwrap_or(false);
            let event_type = listener.event_type();
            drop(_guard);
            if removed {
                node::propagate_event(&node, event_type);
            }
        }
        ListenerOutcome::Success | ListenerOutcome::Invalid => {}
    }
}

fn dispatch_router(
    owner: &Weak<NodeInner>,
    routes: &[(Arc<dyn EventFilter>, Weak<NodeInner>)],
    event_type: TypeId,
    event_type_name: &'static str,
    event: &dyn Event,
) {
    let Some(owner) = owner.upgrade() else { return };

    // Resolve the live mapped-children table under a short critical
    // section, then drop the lock before recursing into matched
    // children (a child's own listeners may themselves edit `owner`).
    let mut targets = Vec::new();
    {
        let mapped = owner.mapped_children.lock();
        for (filter, child) in routes {
            let key = filter.extract_key(event);
            if let Some(candidate) = mapped.get(&key) {
                if let Some(child) = child.upgrade() {
                    if Arc::ptr_eq(candidate, &child) {
                        targets.push(candidate.clone());
                    }
                }
            }
        }
    }

    for child_inner in targets {
        let child = node::Node { inner: child_inner };
        if let Ok(handle) = child.get_handle_by_id(event_type, event_type_name) {
            let _ = child.call(event, &handle);
        }
    }
}

/// Pre-order tree walk building `out` per invariant 5: this node's own
/// listeners/bindings for every type the TypeWalker yields, then a
/// router for qualifying mapped children, then each regular child in
/// ascending-priority order (recursively).
fn recursive_update(
    node: &Arc<NodeInner>,
    event_type: TypeId,
    event_type_name: &'static str,
    out: &mut Vec<FlattenedEntry>,
) {
    for t in typewalk::walk(node.hierarchy.as_ref(), event_type) {
        let cloned = node
            .listener_entries
            .lock()
            .get(&t)
            .map(|entry| (entry.listeners.clone(), entry.binding_consumers.clone()));
        if let Some((listeners, consumers)) = cloned {
            for listener in listeners {
                out.push(FlattenedEntry::Listener {
                    node: Arc::downgrade(node),
                    listener,
                });
            }
            for consumer in consumers {
                out.push(FlattenedEntry::Binding { consumer });
            }
        }
    }

    let mapped: Vec<(HandlerKey, Arc<NodeInner>)> = node
        .mapped_children
        .lock()
        .iter()
        .map(|(k, v)| (k.clone(), Arc::clone(v)))
        .collect();
    let mut routes = Vec::new();
    for (_, child) in &mapped {
        if !node.hierarchy.is_subtype(event_type, child.base_event_type) {
            continue;
        }
        if subtree_has_listener(child, event_type) {
            routes.push((Arc::clone(&child.filter), Arc::downgrade(child)));
        }
    }
    if !routes.is_empty() {
        out.push(FlattenedEntry::Router {
            owner: Arc::downgrade(node),
            routes,
            event_type,
            event_type_name,
        });
    }

    let mut children: Vec<Arc<NodeInner>> = node
        .children
        .lock()
        .iter()
        .filter(|c| node.hierarchy.is_subtype(event_type, c.base_event_type))
        .cloned()
        .collect();
    children.sort_by_key(|c| c.priority.load(Ordering::Relaxed));
    for child in children {
        recursive_update(&child, event_type, event_type_name, out);
    }
}

/// Whether `node`'s subtree (itself, its children, and its own mapped
/// children) has any listener or binding reachable for `event_type`.
/// Used only to decide whether a mapped child is worth routing to at
/// all — correctness does not depend on it, since calling into an
/// empty subtree is already a no-op.
fn subtree_has_listener(node: &Arc<NodeInner>, event_type: TypeId) -> bool {
    for t in typewalk::walk(node.hierarchy.as_ref(), event_type) {
        if node
            .listener_entries
            .lock()
            .get(&t)
            .is_some_and(|e| !e.is_empty())
        {
            return true;
        }
    }
    for child in node.children.lock().iter() {
        if node.hierarchy.is_subtype(event_type, child.base_event_type)
            && subtree_has_listener(child, event_type)
        {
            return true;
        }
    }
    for child in node.mapped_children.lock().values() {
        if node.hierarchy.is_subtype(event_type, child.base_event_type)
            && subtree_has_listener(child, event_type)
        {
            return true;
        }
    }
    false
}
