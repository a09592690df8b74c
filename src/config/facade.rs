//! ConfigLoader facade delegating to the merge service.

use super::merge::service::MergeService;
use super::ContextConfig;
use crate::error::ContextError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment.
    pub fn load() -> Result<ContextConfig, ContextError> {
        Self::finish(MergeService::load(None)?)
    }

    /// Load configuration with `path` layered over the global file.
    pub fn load_from_file(path: &Path) -> Result<ContextConfig, ContextError> {
        Self::finish(MergeService::load(Some(path))?)
    }

    fn finish(config: ContextConfig) -> Result<ContextConfig, ContextError> {
        config.validate()?;
        Ok(config)
    }
}
