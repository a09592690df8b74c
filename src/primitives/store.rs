//! Persistent key-value store (`$store`).

pub mod contract;
pub mod file;

pub use contract::{KeyValueStore, StoreHandle};
pub use file::FileStore;
