//! Script console
//!
//! The logger handed to scripts as `console`. Adapters also route
//! notifications and callback failures through it.

use std::sync::Arc;

/// Host console a script writes to.
pub trait ScriptConsole: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn error(&self, message: &str);
    /// User-facing notification (Surge `$notification.post`, Quantumult X `$notify`).
    fn notify(&self, message: &str);
}

/// Console backed by `tracing` events, tagged with a `head` field.
#[derive(Debug, Clone)]
pub struct TracingConsole {
    head: String,
}

impl TracingConsole {
    pub fn new(head: impl Into<String>) -> Self {
        Self { head: head.into() }
    }

    pub fn head(&self) -> &str {
        &self.head
    }
}

impl Default for TracingConsole {
    fn default() -> Self {
        Self::new("context")
    }
}

impl ScriptConsole for TracingConsole {
    fn debug(&self, message: &str) {
        tracing::debug!(head = %self.head, "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(head = %self.head, "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(head = %self.head, "{}", message);
    }

    fn notify(&self, message: &str) {
        tracing::info!(target: "scriptshim::notify", head = %self.head, "{}", message);
    }
}

/// Shared console handle.
pub type ConsoleHandle = Arc<dyn ScriptConsole>;

pub(crate) fn default_console() -> ConsoleHandle {
    Arc::new(TracingConsole::default())
}
