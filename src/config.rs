//! Configuration
//!
//! One immutable [`ContextConfig`] is loaded up front and handed to the
//! context builder. Nothing reads configuration from globals afterwards.

pub mod facade;

pub mod merge {
    pub mod service;
}

pub mod paths {
    pub mod xdg_root;
}

pub mod sources {
    pub mod environment;
    pub mod global_file;
}

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::error::ContextError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Timeout applied to every network request unless configured otherwise.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Process-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Timeout for all network requests, in milliseconds. Not overridable per request.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ContextConfig {
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.timeout_ms == 0 {
            return Err(ContextError::ConfigError(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ContextError> {
        toml::to_string_pretty(self)
            .map_err(|e| ContextError::ConfigError(format!("Failed to serialize config: {}", e)))
    }
}

/// Persistent store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store directory; defaults to `$XDG_DATA_HOME/scriptshim/Store`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl StoreConfig {
    pub fn resolve_dir(&self) -> Result<PathBuf, ContextError> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => xdg::store_dir(),
        }
    }
}
