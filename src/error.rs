//! Error types
//!
//! Failures below the normalization boundary (transport, storage, header
//! parsing) are absorbed by the adapters and turned into sentinel values.
//! Only builder setup and configuration errors reach the caller as `Err`.

use thiserror::Error;

/// Crate-level error.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Module not permitted or not found: {0}")]
    ModuleNotFound(String),

    #[error("Module call {module}.{method} failed: {message}")]
    ModuleCall {
        module: String,
        method: String,
        message: String,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<config::ConfigError> for ContextError {
    fn from(err: config::ConfigError) -> Self {
        ContextError::ConfigError(err.to_string())
    }
}

/// Failure of the underlying HTTP transport.
///
/// Non-2xx statuses are not transport failures; they resolve as ordinary
/// responses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no async runtime to dispatch the request on")]
    NoRuntime,

    #[error("transport error: {0}")]
    Other(String),
}

/// Encoded header text that could not be turned into a mapping.
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("headers are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("headers must decode to an object, got {0}")]
    NotAnObject(&'static str),
}
