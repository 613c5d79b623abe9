//! Standardized logging for dispatch_core
//!
//! This module provides a consistent logging approach for the whole crate.

use log::{LevelFilter, debug, error, info, trace, warn};
use std::sync::OnceLock;

/// Initialize the process-wide logger. Intended for binaries and tests;
/// a library consumer embedding this crate may already have its own
/// `env_logger`/`log` setup and can skip calling this.
pub fn init(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(Some(env_logger::fmt::TimestampPrecision::Millis))
        .format_module_path(true)
        .init();

    info!("dispatch_core logging initialized with level: {:?}", level);
}

/// Logger wrapper for component-based logging
pub struct ComponentLogger {
    component: &'static str,
}

impl ComponentLogger {
    /// Create a new component logger
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    /// Log a trace message for this component
    pub fn trace(&self, message: &str) {
        trace!("[{}] {}", self.component, message);
    }

    /// Log a debug message for this component
    pub fn debug(&self, message: &str) {
        debug!("[{}] {}", self.component, message);
    }

    /// Log an info message for this component
    pub fn info(&self, message: &str) {
        info!("[{}] {}", self.component, message);
    }

    /// Log a warning message for this component
    pub fn warn(&self, message: &str) {
        warn!("[{}] {}", self.component, message);
    }

    /// Log an error message for this component
    pub fn error(&self, message: &str) {
        error!("[{}] {}", self.component, message);
    }
}

/// Get a logger for a specific component
pub fn get_logger(component: &'static str) -> ComponentLogger {
    ComponentLogger::new(component)
}

/// Logs structural tree edits: add/remove child, map/unmap, add/remove
/// listener, register/unregister binding.
pub fn tree_logger() -> &'static ComponentLogger {
    static LOGGER: OnceLock<ComponentLogger> = OnceLock::new();
    LOGGER.get_or_init(|| ComponentLogger::new("Tree"))
}

/// Logs Handle rebuilds (cache misses) at `trace`.
pub fn handle_logger() -> &'static ComponentLogger {
    static LOGGER: OnceLock<ComponentLogger> = OnceLock::new();
    LOGGER.get_or_init(|| ComponentLogger::new("Handle"))
}

/// Logs listener exceptions caught during dispatch.
pub fn dispatch_logger() -> &'static ComponentLogger {
    static LOGGER: OnceLock<ComponentLogger> = OnceLock::new();
    LOGGER.get_or_init(|| ComponentLogger::new("Dispatch"))
}
