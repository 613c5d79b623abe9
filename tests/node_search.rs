//! `find_children`/`replace_children`/`remove_children`: a full-subtree
//! search, versus the level-stopping walk the latter two use because a
//! match is detached as one whole unit.

mod common;

use std::any::TypeId;

use common::{event_a_filter, EventA};
use dispatch_core::Node;

#[test]
fn find_children_returns_every_match_in_the_subtree() {
    let root = Node::new("root", event_a_filter());
    let outer = Node::new("target", event_a_filter());
    let inner = Node::new("target", event_a_filter());
    outer.add_child(&inner).unwrap();
    root.add_child(&outer).unwrap();

    let found = root.find_children("target", TypeId::of::<EventA>());
    assert_eq!(found.len(), 2, "both the outer and the nested match must be found");
}

#[test]
fn find_children_by_name_ignores_base_type() {
    let root = Node::new("root", event_a_filter());
    let child = Node::new("target", event_a_filter());
    root.add_child(&child).unwrap();

    assert_eq!(root.find_children_by_name("target").len(), 1);
    assert_eq!(root.find_children_by_name("missing").len(), 0);
}

#[test]
fn remove_children_detaches_a_matched_subtree_as_one_unit() {
    let root = Node::new("root", event_a_filter());
    let outer = Node::new("target", event_a_filter());
    let inner = Node::new("target", event_a_filter());
    outer.add_child(&inner).unwrap();
    root.add_child(&outer).unwrap();

    let removed = root.remove_children("target", TypeId::of::<EventA>());
    assert_eq!(
        removed, 1,
        "the nested match lives inside the outer match and must not be separately counted"
    );
    assert!(root.find_children_by_name("target").is_empty());
    assert!(outer.parent().is_none());
    // inner was never independently touched; it is still outer's child,
    // just no longer reachable from root.
    assert_eq!(inner.parent().unwrap(), outer);
}

#[test]
fn replace_children_replaces_a_matched_subtree_as_one_unit() {
    let root = Node::new("root", event_a_filter());
    let outer = Node::new("target", event_a_filter());
    let inner = Node::new("target", event_a_filter());
    outer.add_child(&inner).unwrap();
    root.add_child(&outer).unwrap();

    let replaced = root
        .replace_children("target", TypeId::of::<EventA>(), || {
            Node::new("replacement", event_a_filter())
        })
        .unwrap();
    assert_eq!(
        replaced, 1,
        "the nested match must not produce a second, orphaned replacement"
    );

    let replacements = root.find_children_by_name("replacement");
    assert_eq!(replacements.len(), 1);
    assert!(outer.parent().is_none());
}

#[test]
fn remove_children_by_name_ignores_base_type() {
    let root = Node::new("root", event_a_filter());
    let child = Node::new("target", event_a_filter());
    root.add_child(&child).unwrap();

    let removed = root.remove_children_by_name("target");
    assert_eq!(removed, 1);
    assert!(child.parent().is_none());
}
