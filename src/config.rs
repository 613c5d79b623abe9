//! Configuration types for dispatch_core
//!
//! The core itself takes configuration as plain constructor arguments
//! (see [`crate::Node::new`]); this module only covers the ambient bits a
//! standalone binary embedding the crate would want: a log level and,
//! optionally, a YAML file to source them from.

use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Configuration for a demo/CLI harness built on top of the dispatch
/// tree. Not consumed by the core itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Log level, as a string so it round-trips through YAML
    /// (`"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`, `"off"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Name to give the root node of the demo tree.
    #[serde(default = "default_root_name")]
    pub root_name: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_root_name() -> String {
    "root".to_string()
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            root_name: default_root_name(),
        }
    }
}

impl DispatchConfig {
    /// Load configuration from a YAML file, falling back to defaults for
    /// any field the file omits.
    pub fn from_yaml_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse `log_level` into a [`LevelFilter`], defaulting to `Info` on
    /// an unrecognized string rather than failing configuration load.
    pub fn level_filter(&self) -> LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = DispatchConfig::default();
        assert_eq!(config.root_name, "root");
        assert_eq!(config.level_filter(), LevelFilter::Info);
    }

    #[test]
    fn parses_partial_yaml() {
        let config: DispatchConfig = serde_yaml::from_str("log_level: debug\n").unwrap();
        assert_eq!(config.level_filter(), LevelFilter::Debug);
        assert_eq!(config.root_name, "root");
    }
}
