use std::sync::Arc;

/// Key-value store port.
///
/// Neither operation fails towards the caller: a missing or unreadable entry
/// reads as `None`, a failed write returns `false`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, value: &str, key: &str) -> bool;
}

pub type StoreHandle = Arc<dyn KeyValueStore>;
