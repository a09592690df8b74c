use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use scriptshim::config::{ContextConfig, StoreConfig};
use scriptshim::primitives::{FileStore, HttpTransport, MemoryFeedSink};
use scriptshim::types::{HeaderMap, RawBody, RawResponse, Request};
use scriptshim::{ContextBuilder, ScriptConsole, TransportError};
use tempfile::TempDir;

static ENV_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Transport that records every request and answers with a fixed reply.
pub struct FakeTransport {
    seen: Mutex<Vec<Request>>,
    reply: Result<RawResponse, TransportError>,
}

impl FakeTransport {
    pub fn ok(status: u16, body: RawBody) -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            reply: Ok(RawResponse {
                status,
                headers: HeaderMap::from([(
                    "Content-Type".to_string(),
                    "application/json".to_string(),
                )]),
                body,
            }),
        })
    }

    pub fn failing(error: TransportError) -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            reply: Err(error),
        })
    }

    pub fn requests(&self) -> Vec<Request> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: &Request) -> Result<RawResponse, TransportError> {
        self.seen.lock().push(request.clone());
        self.reply.clone()
    }
}

/// Console that keeps everything written to it.
#[derive(Default)]
pub struct CapturingConsole {
    pub errors: Mutex<Vec<String>>,
    pub notifications: Mutex<Vec<String>>,
}

impl CapturingConsole {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications.lock().clone()
    }
}

impl ScriptConsole for CapturingConsole {
    fn debug(&self, _message: &str) {}

    fn info(&self, _message: &str) {}

    fn error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }

    fn notify(&self, message: &str) {
        self.notifications.lock().push(message.to_string());
    }
}

/// Builder wired to fakes, with a file store in a temp directory.
pub struct Harness {
    pub builder: ContextBuilder,
    pub transport: Arc<FakeTransport>,
    pub console: Arc<CapturingConsole>,
    pub feed: Arc<MemoryFeedSink>,
    pub store_dir: TempDir,
}

impl Harness {
    pub fn new(transport: Arc<FakeTransport>) -> Self {
        let store_dir = TempDir::new().unwrap();
        let config = ContextConfig {
            timeout_ms: 2500,
            store: StoreConfig {
                dir: Some(store_dir.path().to_path_buf()),
            },
            ..Default::default()
        };
        let store = Arc::new(FileStore::open(store_dir.path()).unwrap());
        let console = Arc::new(CapturingConsole::default());
        let feed = Arc::new(MemoryFeedSink::new());
        let builder = ContextBuilder::with_parts(config, transport.clone(), store, feed.clone())
            .with_console(console.clone());
        Self {
            builder,
            transport,
            console,
            feed,
            store_dir,
        }
    }

    pub fn answering(status: u16, body: RawBody) -> Self {
        Self::new(FakeTransport::ok(status, body))
    }
}

/// Run `f` with XDG directories pointed into `temp_dir`.
pub fn with_xdg_env<F, R>(temp_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    with_env(temp_dir, &[], f)
}

/// Like [`with_xdg_env`], with `vars` also set for the duration of `f`.
pub fn with_env<F, R>(temp_dir: &TempDir, vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_LOCK.lock();
    let keys: Vec<&str> = ["XDG_CONFIG_HOME", "XDG_DATA_HOME"]
        .into_iter()
        .chain(vars.iter().map(|(key, _)| *key))
        .collect();
    let saved: Vec<(&str, Option<String>)> = keys
        .into_iter()
        .map(|key| (key, std::env::var(key).ok()))
        .collect();

    std::env::set_var("XDG_CONFIG_HOME", temp_dir.path().join("config"));
    std::env::set_var("XDG_DATA_HOME", temp_dir.path().join("data"));
    for (key, value) in vars {
        std::env::set_var(key, value);
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    for (key, value) in saved {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }

    match result {
        Ok(value) => value,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}
