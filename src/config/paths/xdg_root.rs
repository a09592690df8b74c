//! XDG Base Directory utilities for store and config locations.

use crate::error::ContextError;
use std::path::PathBuf;

/// Get XDG data home directory
///
/// Returns `$XDG_DATA_HOME` if set, otherwise defaults to `$HOME/.local/share`
pub fn data_home() -> Option<PathBuf> {
    if let Ok(xdg_data_home) = std::env::var("XDG_DATA_HOME") {
        if !xdg_data_home.is_empty() {
            return Some(PathBuf::from(xdg_data_home));
        }
    }

    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".local").join("share"))
}

/// Get XDG config home directory
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise defaults to `$HOME/.config`
pub fn config_home() -> Result<PathBuf, ContextError> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg_config_home.is_empty() {
            return Ok(PathBuf::from(xdg_config_home));
        }
    }

    let home = std::env::var("HOME").map_err(|_| {
        ContextError::ConfigError(
            "Could not determine XDG config home directory (HOME not set)".to_string(),
        )
    })?;

    Ok(PathBuf::from(home).join(".config"))
}

/// Default store directory: `$XDG_DATA_HOME/scriptshim/Store`
///
/// Not created here; the file store creates it when opened.
pub fn store_dir() -> Result<PathBuf, ContextError> {
    let data_home = data_home().ok_or_else(|| {
        ContextError::ConfigError(
            "Could not determine XDG data home directory (HOME not set)".to_string(),
        )
    })?;
    Ok(data_home.join("scriptshim").join("Store"))
}

/// Global config file: `$XDG_CONFIG_HOME/scriptshim/config.toml`
pub fn global_config_path() -> Result<PathBuf, ContextError> {
    Ok(config_home()?.join("scriptshim").join("config.toml"))
}
