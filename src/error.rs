//! Error handling for dispatch_core
//!
//! Structural tree edits raise a typed [`Error`]; listener failures never
//! do (they are caught, reported via an [`ExceptionReporter`], and
//! dispatch continues — see `call` in [`crate::node`]).

use std::sync::Arc;

use thiserror::Error;

// Re-export anyhow types for consumers who want a single blanket error
// around combinations of this crate's errors and their own.
pub use anyhow::{Context, Result as AnyhowResult};

/// Structural errors produced by tree-mutating operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Attempted to attach a node that already has a parent.
    #[error("node '{0}' already has a parent")]
    AlreadyParented(String),

    /// Attempted to attach a node as a child of itself or its immediate
    /// parent (see `DESIGN.md` for why this only catches the shallow case).
    #[error("attaching '{child}' under '{parent}' would create a cycle")]
    Cycle { child: String, parent: String },

    /// A handle was passed to `call` on a node other than its owner.
    #[error("handle for '{event_type}' does not belong to node '{node}'")]
    WrongOwner {
        node: String,
        event_type: &'static str,
    },

    /// A handle was requested, or a child attached, with an event type
    /// incompatible with a node's base event type.
    #[error("event type '{requested}' is not a subtype of node '{node}' base type '{base}'")]
    TypeMismatch {
        node: String,
        base: &'static str,
        requested: &'static str,
    },

    /// Attempted to map a node under itself.
    #[error("cannot map node '{0}' under itself")]
    SelfMap(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Sink consulted whenever a listener's `run` call fails. The default
/// implementation logs through [`crate::logging`]; tests typically swap
/// in a recording reporter to assert on what was caught.
pub trait ExceptionReporter: Send + Sync {
    fn report(&self, node_name: &str, event_type_name: &str, message: &str);
}

/// Default reporter: logs the exception at `error` level and otherwise
/// drops it, matching the spec's "caught, reported, dispatch continues"
/// policy.
#[derive(Debug, Default)]
pub struct LoggingExceptionReporter;

impl ExceptionReporter for LoggingExceptionReporter {
    fn report(&self, node_name: &str, event_type_name: &str, message: &str) {
        crate::logging::dispatch_logger().error(&format!(
            "listener on node '{node_name}' for event '{event_type_name}' failed: {message}"
        ));
    }
}

/// Returns the crate-wide default reporter instance, shared rather than
/// reallocated per node.
pub fn default_reporter() -> Arc<dyn ExceptionReporter> {
    use once_cell::sync::Lazy;
    static DEFAULT: Lazy<Arc<dyn ExceptionReporter>> =
        Lazy::new(|| Arc::new(LoggingExceptionReporter));
    DEFAULT.clone()
}
