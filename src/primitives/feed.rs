//! Push notification primitive (`$feed`).

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// One pushed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub description: String,
    pub url: String,
    pub pushed_at: DateTime<Utc>,
}

/// Outbound feed transport. Fire-and-forget.
pub trait FeedSink: Send + Sync {
    fn push(&self, item: FeedItem);
}

/// Sink that only logs pushed items.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingFeedSink;

impl FeedSink for LoggingFeedSink {
    fn push(&self, item: FeedItem) {
        tracing::info!(
            title = %item.title,
            url = %item.url,
            pushed_at = %item.pushed_at.to_rfc3339(),
            "feed push: {}",
            item.description
        );
    }
}

/// Sink that keeps pushed items in memory.
#[derive(Debug, Default)]
pub struct MemoryFeedSink {
    items: Mutex<Vec<FeedItem>>,
}

impl MemoryFeedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> Vec<FeedItem> {
        self.items.lock().clone()
    }
}

impl FeedSink for MemoryFeedSink {
    fn push(&self, item: FeedItem) {
        self.items.lock().push(item);
    }
}

/// Script-facing feed handle.
#[derive(Clone)]
pub struct Feed {
    sink: Arc<dyn FeedSink>,
}

impl Feed {
    pub fn new(sink: Arc<dyn FeedSink>) -> Self {
        Self { sink }
    }

    pub fn push(&self, title: &str, description: &str, url: &str) {
        self.sink.push(FeedItem {
            title: title.to_string(),
            description: description.to_string(),
            url: url.to_string(),
            pushed_at: Utc::now(),
        });
    }
}
