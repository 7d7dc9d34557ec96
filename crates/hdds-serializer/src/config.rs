// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Engine configuration.
//!
//! Supports both programmatic and file-based configuration. The process-wide
//! configuration sits behind an `ArcSwap` and is consulted while schemas are
//! defined (list autoconversion, default `required` flag), never during
//! (de)serialization.
//!
//! ```toml
//! autoconvert_list = true
//! required_by_default = false
//! log_level = "warn"
//! ```

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Turn lists of vector-eligible scalars into `Vector`/`Matrix` types.
    #[serde(default = "default_true")]
    pub autoconvert_list: bool,

    /// Initial `required` flag of newly defined base types.
    #[serde(default)]
    pub required_by_default: bool,

    /// Log level used by front-ends that install a subscriber.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            autoconvert_list: true,
            required_by_default: false,
            log_level: default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown log level '{}' (expected one of {})",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

static GLOBAL: OnceLock<ArcSwap<EngineConfig>> = OnceLock::new();

fn global() -> &'static ArcSwap<EngineConfig> {
    GLOBAL.get_or_init(|| ArcSwap::from_pointee(EngineConfig::default()))
}

/// Install the process-wide configuration.
///
/// Call during the single-threaded schema-definition phase.
pub fn install(config: EngineConfig) {
    log::debug!(
        "[config] installing autoconvert_list={} required_by_default={}",
        config.autoconvert_list,
        config.required_by_default
    );
    global().store(Arc::new(config));
}

/// Snapshot of the process-wide configuration.
pub fn current() -> Arc<EngineConfig> {
    global().load_full()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.autoconvert_list);
        assert!(!config.required_by_default);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str("required_by_default = true\n").unwrap();
        assert!(config.autoconvert_list);
        assert!(config.required_by_default);
    }

    #[test]
    fn test_invalid_log_level() {
        let err = EngineConfig::from_toml_str("log_level = \"loud\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "autoconvert_list = false").unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert!(!config.autoconvert_list);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file("/nonexistent/engine.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
