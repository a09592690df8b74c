//! MergeService: orchestrates sources and deserializes to ContextConfig.

use crate::config::sources::{environment, global_file};
use crate::config::{ContextConfig, DEFAULT_TIMEOUT_MS};
use config::{Config, ConfigError, File};
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> global file -> explicit file -> environment (highest).
    pub fn load(explicit: Option<&Path>) -> Result<ContextConfig, ConfigError> {
        let builder = Config::builder().set_default("timeout_ms", DEFAULT_TIMEOUT_MS as i64)?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = match explicit {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder,
        };
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
