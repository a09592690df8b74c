//! `setTimeout` equivalent.

use std::time::Duration;
use tokio::runtime::Handle;

/// Timer scheduling primitive.
///
/// Callbacks fire no earlier than their delay. There is no handle to cancel
/// them and no ordering promise beyond delay order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timer;

impl Timer {
    pub fn new() -> Self {
        Self
    }

    /// Schedule `callback` after `delay_ms` on the current tokio runtime.
    ///
    /// Returns `false`, dropping `callback`, when there is no runtime.
    pub fn schedule<F>(&self, delay_ms: u64, callback: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(handle) = Handle::try_current() else {
            tracing::warn!(delay_ms, "setTimeout called outside a runtime; callback dropped");
            return false;
        };
        handle.spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            callback();
        });
        true
    }
}
