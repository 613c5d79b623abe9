//! Node: a named tree vertex owning children, mapped children, listener
//! entries and a per-event-type Handle table.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};

use crate::error::{default_reporter, Error, ExceptionReporter, Result};
use crate::event::{Event, EventHierarchy, FlatHierarchy, HandlerKey};
use crate::filter::{EventFilter, Predicate};
use crate::handle::Handle;
use crate::listener::{ErasedListener, EventBinding, ListenerEntry, ListenerHandle};
use crate::logging;
use crate::typewalk;

/// The single process-wide structural lock (§5 of the design). It
/// serializes every tree mutation and every Handle rebuild. It is
/// reentrant: a listener invoked during dispatch (after the lock has
/// already been released) may trigger a structural edit — e.g. an
/// `Expired` self-removal — which re-acquires this same lock.
static STRUCTURAL_LOCK: Lazy<ReentrantMutex<()>> = Lazy::new(|| ReentrantMutex::new(()));

pub(crate) fn lock_structural() -> ReentrantMutexGuard<'static, ()> {
    STRUCTURAL_LOCK.lock()
}

/// The shared, reference-counted node body. Children are owned
/// top-down via `Arc`; the back-reference to the parent is a plain
/// `Weak`, reset to `None` on detach — never an owning edge.
pub(crate) struct NodeInner {
    pub(crate) name: String,
    pub(crate) base_event_type: TypeId,
    pub(crate) base_event_type_name: &'static str,
    pub(crate) filter: Arc<dyn EventFilter>,
    pub(crate) predicate: Option<Arc<dyn Predicate>>,
    pub(crate) priority: AtomicI32,
    pub(crate) hierarchy: Arc<dyn EventHierarchy>,
    pub(crate) reporter: Arc<dyn ExceptionReporter>,
    pub(crate) parent: Mutex<Option<Weak<NodeInner>>>,
    pub(crate) children: Mutex<Vec<Arc<NodeInner>>>,
    pub(crate) mapped_children: Mutex<HashMap<HandlerKey, Arc<NodeInner>>>,
    pub(crate) listener_entries: Mutex<HashMap<TypeId, ListenerEntry>>,
    pub(crate) handles: DashMap<TypeId, Arc<Handle>>,
}

/// A vertex in the dispatch tree. Cheap to clone (an `Arc` bump); two
/// clones referring to the same vertex compare equal.
#[derive(Clone)]
pub struct Node {
    pub(crate) inner: Arc<NodeInner>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.inner.name)
            .field("base_event_type", &self.inner.base_event_type_name)
            .field("priority", &self.priority())
            .finish()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
impl Eq for Node {}

/// Builder for [`Node`], covering the optional collaborators (predicate,
/// event hierarchy, exception reporter) that plain construction doesn't
/// need in the common case.
pub struct NodeBuilder {
    name: String,
    filter: Arc<dyn EventFilter>,
    predicate: Option<Arc<dyn Predicate>>,
    hierarchy: Arc<dyn EventHierarchy>,
    reporter: Arc<dyn ExceptionReporter>,
}

impl NodeBuilder {
    pub fn new(name: impl Into<String>, filter: Arc<dyn EventFilter>) -> Self {
        Self {
            name: name.into(),
            filter,
            predicate: None,
            hierarchy: Arc::new(FlatHierarchy),
            reporter: default_reporter(),
        }
    }

    /// Gate applied to every listener on this node at dispatch time.
    pub fn predicate(mut self, predicate: Arc<dyn Predicate>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// The event-class relation this node's TypeWalker uses. Every node
    /// in one tree should share the same hierarchy instance; the core
    /// does not propagate it across `add_child`/`map`.
    pub fn hierarchy(mut self, hierarchy: Arc<dyn EventHierarchy>) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    /// Sink for listener exceptions raised while dispatching through
    /// this node.
    pub fn reporter(mut self, reporter: Arc<dyn ExceptionReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn build(self) -> Node {
        let base_event_type = self.filter.target_type();
        let base_event_type_name = self.filter.target_type_name();
        Node {
            inner: Arc::new(NodeInner {
                name: self.name,
                base_event_type,
                base_event_type_name,
                filter: self.filter,
                predicate: self.predicate,
                priority: AtomicI32::new(0),
                hierarchy: self.hierarchy,
                reporter: self.reporter,
                parent: Mutex::new(None),
                children: Mutex::new(Vec::new()),
                mapped_children: Mutex::new(HashMap::new()),
                listener_entries: Mutex::new(HashMap::new()),
                handles: DashMap::new(),
            }),
        }
    }
}

impl Node {
    /// Shorthand for `NodeBuilder::new(name, filter).build()`: priority
    /// 0, no predicate, a flat (non-recursive) event hierarchy, and the
    /// crate's default logging exception reporter.
    pub fn new(name: impl Into<String>, filter: Arc<dyn EventFilter>) -> Self {
        NodeBuilder::new(name, filter).build()
    }

    pub fn builder(name: impl Into<String>, filter: Arc<dyn EventFilter>) -> NodeBuilder {
        NodeBuilder::new(name, filter)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn base_event_type(&self) -> TypeId {
        self.inner.base_event_type
    }

    pub fn priority(&self) -> i32 {
        self.inner.priority.load(Ordering::Relaxed)
    }

    /// Changes dispatch-order priority among siblings. Per the source
    /// behavior this crate reproduces (see `DESIGN.md`), this does
    /// **not** invalidate any handle; an already-valid parent handle
    /// keeps its stale order until something else invalidates it.
    pub fn set_priority(&self, priority: i32) {
        self.inner.priority.store(priority, Ordering::Relaxed);
    }

    pub fn parent(&self) -> Option<Node> {
        self.inner
            .parent
            .lock()
            .as_ref()
            .and_then(|w| w.upgrade())
            .map(|inner| Node { inner })
    }

    /// Returns (creating if absent) the Handle keyed by `E`.
    pub fn get_handle<E: Event>(&self) -> Result<Arc<Handle>> {
        self.get_handle_by_id(TypeId::of::<E>(), std::any::type_name::<E>())
    }

    pub(crate) fn get_handle_by_id(
        &self,
        event_type: TypeId,
        event_type_name: &'static str,
    ) -> Result<Arc<Handle>> {
        if !self
            .inner
            .hierarchy
            .is_subtype(event_type, self.inner.base_event_type)
        {
            return Err(Error::TypeMismatch {
                node: self.inner.name.clone(),
                base: self.inner.base_event_type_name,
                requested: event_type_name,
            });
        }
        if let Some(existing) = self.inner.handles.get(&event_type) {
            return Ok(Arc::clone(existing.value()));
        }
        let handle = Arc::new(Handle::new(
            Arc::downgrade(&self.inner),
            event_type,
            event_type_name,
        ));
        let entry = self
            .inner
            .handles
            .entry(event_type)
            .or_insert_with(|| handle);
        Ok(Arc::clone(entry.value()))
    }

    /// Dispatches `event` through `handle`'s cached listener sequence,
    /// rebuilding it first if invalidated. Wait-free in the steady
    /// state: no lock is taken once `handle` is valid.
    pub fn call(&self, event: &dyn Event, handle: &Arc<Handle>) -> Result<()> {
        self.check_owner(handle)?;
        handle.ensure_valid();
        handle.dispatch(event);
        Ok(())
    }

    /// Ensures `handle` is valid, then reports whether its flattened
    /// list is non-empty.
    pub fn has_listener(&self, handle: &Arc<Handle>) -> Result<bool> {
        self.check_owner(handle)?;
        handle.ensure_valid();
        Ok(!handle.is_empty())
    }

    fn check_owner(&self, handle: &Arc<Handle>) -> Result<()> {
        if handle.owned_by(&self.inner) {
            Ok(())
        } else {
            Err(Error::WrongOwner {
                node: self.inner.name.clone(),
                event_type: handle.event_type_name(),
            })
        }
    }

    /// Appends `listener` to this node's entry for `E`, triggering
    /// invalidation of every affected ancestor (and this node's own)
    /// handle.
    pub fn add_listener<E: Event>(&self, listener: Arc<dyn ErasedListener>) -> Result<ListenerHandle> {
        let event_type = TypeId::of::<E>();
        if !self
            .inner
            .hierarchy
            .is_subtype(event_type, self.inner.base_event_type)
        {
            return Err(Error::TypeMismatch {
                node: self.inner.name.clone(),
                base: self.inner.base_event_type_name,
                requested: std::any::type_name::<E>(),
            });
        }
        let _guard = lock_structural();
        let inserted = self
            .inner
            .listener_entries
            .lock()
            .entry(event_type)
            .or_default()
            .add_listener(Arc::clone(&listener));
        let handle = ListenerHandle {
            event_type,
            listener,
        };
        if inserted {
            logging::tree_logger().debug(&format!(
                "added listener on '{}' for '{}'",
                self.inner.name,
                std::any::type_name::<E>()
            ));
            propagate_event(&self.inner, event_type);
        }
        Ok(handle)
    }

    /// Removes a listener by identity. A listener not previously
    /// registered returns silently with no mutation.
    pub fn remove_listener(&self, handle: &ListenerHandle) {
        let _guard = lock_structural();
        let removed = self
            .inner
            .listener_entries
            .lock()
            .get_mut(&handle.event_type)
            .map(|entry| entry.remove_listener(&handle.listener))
            .unwrap_or(false);
        if removed {
            logging::tree_logger().debug(&format!("removed listener on '{}'", self.inner.name));
            propagate_event(&self.inner, handle.event_type);
        }
    }

    /// Bulk-registers a binding's consumers, invalidating only the event
    /// types that actually gained a consumer.
    pub fn register(&self, binding: Arc<dyn EventBinding>) {
        let _guard = lock_structural();
        let mut changed = Vec::new();
        {
            let mut entries = self.inner.listener_entries.lock();
            for event_type in binding.event_types() {
                if let Some(consumer) = binding.consumer(event_type) {
                    if entries.entry(event_type).or_default().add_consumer(consumer) {
                        changed.push(event_type);
                    }
                }
            }
        }
        for event_type in changed {
            logging::tree_logger().debug(&format!("registered binding on '{}'", self.inner.name));
            propagate_event(&self.inner, event_type);
        }
    }

    /// Symmetric to [`Node::register`]: only propagates for event types
    /// where a consumer was actually removed.
    pub fn unregister(&self, binding: Arc<dyn EventBinding>) {
        let _guard = lock_structural();
        let mut changed = Vec::new();
        {
            let mut entries = self.inner.listener_entries.lock();
            for event_type in binding.event_types() {
                if let Some(consumer) = binding.consumer(event_type) {
                    if let Some(entry) = entries.get_mut(&event_type) {
                        if entry.remove_consumer(&consumer) {
                            changed.push(event_type);
                        }
                    }
                }
            }
        }
        for event_type in changed {
            propagate_event(&self.inner, event_type);
        }
    }

    /// Attaches `child` under this node. No-op if `child` is already a
    /// child of this node.
    pub fn add_child(&self, child: &Node) -> Result<()> {
        let _guard = lock_structural();

        if child.inner.parent.lock().is_some() {
            return Err(Error::AlreadyParented(child.inner.name.clone()));
        }
        if let Some(self_parent) = self.parent_inner() {
            if Arc::ptr_eq(&self_parent, &child.inner) {
                return Err(Error::Cycle {
                    child: child.inner.name.clone(),
                    parent: self.inner.name.clone(),
                });
            }
        }
        if !self
            .inner
            .hierarchy
            .is_subtype(child.inner.base_event_type, self.inner.base_event_type)
        {
            return Err(Error::TypeMismatch {
                node: self.inner.name.clone(),
                base: self.inner.base_event_type_name,
                requested: child.inner.base_event_type_name,
            });
        }
        {
            let children = self.inner.children.lock();
            if children.iter().any(|c| Arc::ptr_eq(c, &child.inner)) {
                return Ok(());
            }
        }

        self.inner.children.lock().push(Arc::clone(&child.inner));
        *child.inner.parent.lock() = Some(Arc::downgrade(&self.inner));
        logging::tree_logger().debug(&format!(
            "attached child '{}' to '{}'",
            child.inner.name, self.inner.name
        ));
        propagate_events(&child.inner);
        Ok(())
    }

    /// Detaches `child`. No-op if `child` is not currently a child of
    /// this node.
    pub fn remove_child(&self, child: &Node) {
        let _guard = lock_structural();
        let present = {
            let children = self.inner.children.lock();
            children.iter().any(|c| Arc::ptr_eq(c, &child.inner))
        };
        if !present {
            return;
        }
        propagate_events(&child.inner);
        self.inner
            .children
            .lock()
            .retain(|c| !Arc::ptr_eq(c, &child.inner));
        *child.inner.parent.lock() = None;
        logging::tree_logger().debug(&format!(
            "detached child '{}' from '{}'",
            child.inner.name, self.inner.name
        ));
    }

    /// Attaches `node` under `mapped_children[key]`. A node previously
    /// mapped at `key` is silently evicted (its parent cleared, no
    /// propagation — the newly inserted node's own propagation covers
    /// the same handle types).
    pub fn map(&self, node: &Node, key: HandlerKey) -> Result<()> {
        let _guard = lock_structural();

        if node.inner.parent.lock().is_some() {
            return Err(Error::AlreadyParented(node.inner.name.clone()));
        }
        if Arc::ptr_eq(&self.inner, &node.inner) {
            return Err(Error::SelfMap(node.inner.name.clone()));
        }
        if let Some(self_parent) = self.parent_inner() {
            if Arc::ptr_eq(&self_parent, &node.inner) {
                return Err(Error::SelfMap(node.inner.name.clone()));
            }
        }
        if !self
            .inner
            .hierarchy
            .is_subtype(node.inner.base_event_type, self.inner.base_event_type)
        {
            return Err(Error::TypeMismatch {
                node: self.inner.name.clone(),
                base: self.inner.base_event_type_name,
                requested: node.inner.base_event_type_name,
            });
        }

        let previous = self
            .inner
            .mapped_children
            .lock()
            .insert(key, Arc::clone(&node.inner));
        if let Some(previous) = previous {
            *previous.parent.lock() = None;
        }
        *node.inner.parent.lock() = Some(Arc::downgrade(&self.inner));
        logging::tree_logger().debug(&format!(
            "mapped '{}' under '{}'",
            node.inner.name, self.inner.name
        ));
        propagate_events(&node.inner);
        Ok(())
    }

    /// Removes the mapped entry at `key`, if present.
    pub fn unmap(&self, key: &HandlerKey) {
        let _guard = lock_structural();
        let removed = self.inner.mapped_children.lock().remove(key);
        if let Some(removed) = removed {
            propagate_events(&removed);
            *removed.parent.lock() = None;
            logging::tree_logger().debug(&format!(
                "unmapped '{}' from '{}'",
                removed.name, self.inner.name
            ));
        }
    }

    /// Depth-first subtree search (regular children only — mapped
    /// children are a routing table, not part of the searched tree; see
    /// `DESIGN.md`) for nodes named `name` whose base type admits
    /// `event_type`.
    pub fn find_children(&self, name: &str, event_type: TypeId) -> Vec<Node> {
        let _guard = lock_structural();
        let mut matches = Vec::new();
        collect_matches(&self.inner, name, Some(event_type), &mut matches);
        matches
            .into_iter()
            .map(|(_, child)| Node { inner: child })
            .collect()
    }

    /// Depth-first subtree search ignoring event type.
    pub fn find_children_by_name(&self, name: &str) -> Vec<Node> {
        let _guard = lock_structural();
        let mut matches = Vec::new();
        collect_matches(&self.inner, name, None, &mut matches);
        matches
            .into_iter()
            .map(|(_, child)| Node { inner: child })
            .collect()
    }

    /// Replaces every match at its current position with a freshly
    /// built replacement node (one per match, since a node can have at
    /// most one parent — see `DESIGN.md`). Returns the number replaced.
    ///
    /// Unlike `find_children`, a match stops the walk from descending
    /// into it: the matched node is about to be detached as a whole
    /// unit, so anything nested under it is replaced along with it
    /// rather than being independently collected and orphaned.
    pub fn replace_children<F>(&self, name: &str, event_type: TypeId, make_replacement: F) -> Result<usize>
    where
        F: Fn() -> Node,
    {
        let _guard = lock_structural();
        let mut matches = Vec::new();
        collect_matches_stopping(&self.inner, name, Some(event_type), &mut matches);
        let count = matches.len();
        for (parent, child) in matches {
            let parent_node = Node { inner: parent };
            let child_node = Node { inner: child };
            parent_node.remove_child(&child_node);
            parent_node.add_child(&make_replacement())?;
        }
        Ok(count)
    }

    /// Removes every node named `name` whose base type admits
    /// `event_type`, anywhere in the subtree. A match stops the walk
    /// from descending into it, same as `replace_children`: the whole
    /// matched subtree is detached as one unit.
    pub fn remove_children(&self, name: &str, event_type: TypeId) -> usize {
        let _guard = lock_structural();
        let mut matches = Vec::new();
        collect_matches_stopping(&self.inner, name, Some(event_type), &mut matches);
        let count = matches.len();
        for (parent, child) in matches {
            Node { inner: parent }.remove_child(&Node { inner: child });
        }
        count
    }

    /// Removes every node named `name`, anywhere in the subtree,
    /// regardless of base type.
    pub fn remove_children_by_name(&self, name: &str) -> usize {
        let _guard = lock_structural();
        let mut matches = Vec::new();
        collect_matches_stopping(&self.inner, name, None, &mut matches);
        let count = matches.len();
        for (parent, child) in matches {
            Node { inner: parent }.remove_child(&Node { inner: child });
        }
        count
    }

    fn parent_inner(&self) -> Option<Arc<NodeInner>> {
        self.inner.parent.lock().as_ref().and_then(|w| w.upgrade())
    }
}

fn child_admits(child: &NodeInner, event_type: TypeId) -> bool {
    child.hierarchy.is_subtype(event_type, child.base_event_type)
}

/// Depth-first walk collecting `(parent, matched_child)` pairs. A match
/// doesn't stop recursion into its own children — only the node itself
/// is collected, per `find_children`'s "every Node whose name matches".
fn collect_matches(
    node: &Arc<NodeInner>,
    name: &str,
    event_type: Option<TypeId>,
    out: &mut Vec<(Arc<NodeInner>, Arc<NodeInner>)>,
) {
    let children = node.children.lock().clone();
    for child in children {
        let matches = child.name == name
            && event_type.map_or(true, |t| child_admits(&child, t));
        if matches {
            out.push((Arc::clone(node), Arc::clone(&child)));
        }
        collect_matches(&child, name, event_type, out);
    }
}

/// Depth-first walk collecting `(parent, matched_child)` pairs, stopping
/// descent at a match instead of continuing into it. Used by
/// `replace_children`/`remove_children`, where a match is detached as a
/// whole unit: recursing past it would collect nested matches whose
/// parent is about to become unreachable, double-counting the result
/// and silently losing the nested replacement/removal.
fn collect_matches_stopping(
    node: &Arc<NodeInner>,
    name: &str,
    event_type: Option<TypeId>,
    out: &mut Vec<(Arc<NodeInner>, Arc<NodeInner>)>,
) {
    let children = node.children.lock().clone();
    for child in children {
        let matches = child.name == name
            && event_type.map_or(true, |t| child_admits(&child, t));
        if matches {
            out.push((Arc::clone(node), Arc::clone(&child)));
        } else {
            collect_matches_stopping(&child, name, event_type, out);
        }
    }
}

/// Walks from `node` upward, invalidating every ancestor's (including
/// `node`'s own) handle keyed by any type the TypeWalker yields for
/// `event_type`.
pub(crate) fn propagate_event(node: &Arc<NodeInner>, event_type: TypeId) {
    let mut current = Some(Arc::clone(node));
    while let Some(n) = current {
        for t in typewalk::walk(n.hierarchy.as_ref(), event_type) {
            if let Some(handle) = n.handles.get(&t) {
                handle.invalidate();
            }
        }
        current = n.parent.lock().as_ref().and_then(|w| w.upgrade());
    }
}

/// Bulk variant of [`propagate_event`] over every event type registered
/// anywhere within `node`'s subtree (including its own mapped
/// children). Used on attach/detach, where the whole subtree's listener
/// set becomes visible (or invisible) to ancestors at once.
pub(crate) fn propagate_events(node: &Arc<NodeInner>) {
    let mut types = std::collections::HashSet::new();
    collect_event_types(node, &mut types);
    for t in types {
        propagate_event(node, t);
    }
}

fn collect_event_types(node: &Arc<NodeInner>, out: &mut std::collections::HashSet<TypeId>) {
    out.extend(node.listener_entries.lock().keys().copied());
    for child in node.children.lock().iter() {
        collect_event_types(child, out);
    }
    for child in node.mapped_children.lock().values() {
        collect_event_types(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ListenerOutcome;
    use crate::filter::filter_fn;
    use crate::listener::listener_fn;
    use std::any::Any;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug)]
    struct Ping;
    impl Event for Ping {
        fn class(&self) -> TypeId {
            TypeId::of::<Ping>()
        }
        fn class_name(&self) -> &'static str {
            "Ping"
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn ping_filter() -> Arc<dyn EventFilter> {
        filter_fn(TypeId::of::<Ping>(), "Ping", |_| HandlerKey::None)
    }

    #[test]
    fn add_listener_is_idempotent_for_the_same_listener() {
        let root = Node::new("root", ping_filter());
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        let listener = listener_fn(move |_: &Ping| {
            calls2.fetch_add(1, Ordering::SeqCst);
            ListenerOutcome::Success
        });

        let h1 = root.add_listener::<Ping>(listener.clone()).unwrap();
        let h2 = root.add_listener::<Ping>(listener).unwrap();
        assert_eq!(h1, h2);

        let handle = root.get_handle::<Ping>().unwrap();
        root.call(&Ping, &handle).unwrap();
        assert_eq!(
            calls.load(Ordering::SeqCst),
            1,
            "re-adding the same listener must not duplicate it"
        );
    }

    #[test]
    fn add_child_is_idempotent_for_the_same_child() {
        let root = Node::new("root", ping_filter());
        let child = Node::new("child", ping_filter());
        root.add_child(&child).unwrap();
        root.add_child(&child).unwrap();
        assert_eq!(root.inner.children.lock().len(), 1);
    }

    #[test]
    fn remove_listener_never_registered_is_a_silent_no_op() {
        let root = Node::new("root", ping_filter());
        let listener = listener_fn(|_: &Ping| ListenerOutcome::Success);
        let handle = ListenerHandle {
            event_type: TypeId::of::<Ping>(),
            listener,
        };
        root.remove_listener(&handle);
        assert!(!root.has_listener(&root.get_handle::<Ping>().unwrap()).unwrap());
    }

    #[test]
    fn remove_child_of_an_unrelated_node_is_a_silent_no_op() {
        let root = Node::new("root", ping_filter());
        let other = Node::new("other", ping_filter());
        root.remove_child(&other);
        assert!(other.parent().is_none());
    }

    #[test]
    fn unmap_of_an_unused_key_is_a_silent_no_op() {
        let root = Node::new("root", ping_filter());
        root.unmap(&HandlerKey::from("absent"));
    }

    #[test]
    fn find_children_sees_nested_matches_that_replace_and_remove_children_treat_as_one_unit() {
        let root = Node::new("root", ping_filter());
        let outer = Node::new("target", ping_filter());
        let inner = Node::new("target", ping_filter());
        outer.add_child(&inner).unwrap();
        root.add_child(&outer).unwrap();

        let found = root.find_children("target", TypeId::of::<Ping>());
        assert_eq!(found.len(), 2, "find_children is a full-subtree search");

        let removed = root.remove_children("target", TypeId::of::<Ping>());
        assert_eq!(
            removed, 1,
            "remove_children must stop descending at the outer match, not also count the nested one"
        );
        assert!(outer.parent().is_none());
        assert_eq!(inner.parent().unwrap(), outer, "the nested match travels with its detached parent");
    }
}
