//! Shared Primitive Set
//!
//! Environment-agnostic capabilities present in every context: `setTimeout`,
//! `$axios`, `$store`, `$feed`. Both adapters are built on top of these.

pub mod feed;
pub mod network;
pub mod store;
pub mod timer;

pub use feed::{Feed, FeedItem, FeedSink, LoggingFeedSink, MemoryFeedSink};
pub use network::{HttpRequester, HttpTransport, ReqwestTransport};
pub use store::{FileStore, KeyValueStore, StoreHandle};
pub use timer::Timer;

/// Names of the shared surface, always exposed.
pub const SHARED_SURFACE: &[&str] = &["setTimeout", "$axios", "$store", "$feed", "console"];

/// The primitive set a context is built over.
#[derive(Clone)]
pub struct SharedPrimitives {
    pub timer: Timer,
    pub network: HttpRequester,
    pub store: StoreHandle,
    pub feed: Feed,
}

impl SharedPrimitives {
    pub fn new(network: HttpRequester, store: StoreHandle, feed: Feed) -> Self {
        Self {
            timer: Timer::new(),
            network,
            store,
            feed,
        }
    }
}
