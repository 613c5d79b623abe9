//! dispatch_core - a hierarchical, type-routed event dispatch tree
//!
//! A [`Node`] is a named vertex that owns listeners, child nodes, and
//! keyed "mapped" children. Dispatching an event walks the tree once
//! per distinct (node, event-class) pair and caches the result in a
//! [`Handle`]; subsequent dispatches of the same class through the
//! same node replay that cached sequence without touching the
//! structural lock, as long as nothing has edited the tree since.

pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod handle;
pub mod listener;
pub mod logging;
mod node;
pub mod typewalk;

pub use error::{AnyhowResult, Error, ExceptionReporter, LoggingExceptionReporter, Result};
pub use event::{Event, EventHierarchy, FlatHierarchy, HandlerKey, ListenerOutcome};
pub use filter::{filter_fn, predicate_fn, EventFilter, FnFilter, FnPredicate, Predicate};
pub use handle::Handle;
pub use listener::{
    consumer_fn, listener_fn, ErasedConsumer, ErasedListener, EventBinding, ListenerHandle,
};
pub use node::{Node, NodeBuilder};
