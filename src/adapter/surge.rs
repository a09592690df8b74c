//! Surge-style environment.
//!
//! Exposes `$httpClient.get/post` with error-first callbacks,
//! `$persistentStore.read/write`, `$notification.post` and `$done`.

use super::{build_request, guard_callback, CallbackResult, EnvironmentAdapter, EnvironmentKind};
use crate::console::ConsoleHandle;
use crate::error::TransportError;
use crate::primitives::{HttpRequester, SharedPrimitives, StoreHandle};
use crate::types::{Response, ScriptRequest};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub const SURGE_SURFACE: &[&str] = &["$httpClient", "$persistentStore", "$notification", "$done"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurgeMethod {
    Get,
    Post,
}

impl SurgeMethod {
    fn as_str(self) -> &'static str {
        match self {
            SurgeMethod::Get => "GET",
            SurgeMethod::Post => "POST",
        }
    }

    fn label(self) -> &'static str {
        match self {
            SurgeMethod::Get => "httpClient.get",
            SurgeMethod::Post => "httpClient.post",
        }
    }

    /// Body text handed to the callback when the transport fails.
    fn error_body(self, err: &TransportError) -> String {
        match self {
            SurgeMethod::Get => "{error: '$httpClient.get no response'}".to_string(),
            SurgeMethod::Post => format!("{{ error: {} }}", err),
        }
    }
}

/// Completes once the callback of a `$httpClient` call has run.
///
/// Dropping it does not cancel the request.
pub struct CallHandle {
    task: Option<JoinHandle<()>>,
}

impl Future for CallHandle {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        match self.task.as_mut() {
            // Callback failures are caught inside the task; a join error
            // only means the runtime shut down.
            Some(task) => Pin::new(task).poll(cx).map(|_| ()),
            None => Poll::Ready(()),
        }
    }
}

/// `$httpClient`
#[derive(Clone)]
pub struct HttpClient {
    network: HttpRequester,
    console: ConsoleHandle,
}

impl HttpClient {
    pub fn new(network: HttpRequester, console: ConsoleHandle) -> Self {
        Self { network, console }
    }

    /// `$httpClient.get(req, cb)`.
    ///
    /// On success `cb(None, Some(response), body)`; on transport failure
    /// `cb(Some(error), None, sentinel)`. The returned handle completes once
    /// the callback has run.
    ///
    /// Outside a tokio runtime the callback runs immediately with
    /// [`TransportError::NoRuntime`].
    pub fn get<F>(&self, req: ScriptRequest, callback: F) -> CallHandle
    where
        F: FnOnce(Option<&TransportError>, Option<&Response>, &str) -> CallbackResult
            + Send
            + 'static,
    {
        self.dispatch(SurgeMethod::Get, req, callback)
    }

    /// `$httpClient.post(req, cb)`, same contract as [`HttpClient::get`].
    pub fn post<F>(&self, req: ScriptRequest, callback: F) -> CallHandle
    where
        F: FnOnce(Option<&TransportError>, Option<&Response>, &str) -> CallbackResult
            + Send
            + 'static,
    {
        self.dispatch(SurgeMethod::Post, req, callback)
    }

    fn dispatch<F>(&self, method: SurgeMethod, req: ScriptRequest, callback: F) -> CallHandle
    where
        F: FnOnce(Option<&TransportError>, Option<&Response>, &str) -> CallbackResult
            + Send
            + 'static,
    {
        let request = build_request(&req, method.as_str());
        let network = self.network.clone();
        let console = self.console.clone();

        let Ok(handle) = Handle::try_current() else {
            fail(&console, method, TransportError::NoRuntime, callback);
            return CallHandle { task: None };
        };

        let task = handle.spawn(async move {
            match network.request(request).await {
                Ok(response) => guard_callback(console.as_ref(), method.label(), || {
                    callback(None, Some(&response), &response.body)
                }),
                Err(e) => fail(&console, method, e, callback),
            }
        });
        CallHandle { task: Some(task) }
    }
}

/// Deliver a transport failure error-first, with the method's sentinel body.
fn fail<F>(console: &ConsoleHandle, method: SurgeMethod, err: TransportError, callback: F)
where
    F: FnOnce(Option<&TransportError>, Option<&Response>, &str) -> CallbackResult,
{
    tracing::error!("{} error: {}", method.label(), err);
    let sentinel = method.error_body(&err);
    guard_callback(console.as_ref(), method.label(), || {
        callback(Some(&err), None, &sentinel)
    });
}

/// `$persistentStore`
#[derive(Clone)]
pub struct PersistentStore {
    store: StoreHandle,
}

impl PersistentStore {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    pub fn read(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    pub fn write(&self, value: &str, key: &str) -> bool {
        self.store.put(value, key)
    }
}

/// `$notification`
#[derive(Clone)]
pub struct Notification {
    console: ConsoleHandle,
}

impl Notification {
    pub fn new(console: ConsoleHandle) -> Self {
        Self { console }
    }

    /// `$notification.post(title, subtitle, body, ...)`
    pub fn post(&self, parts: &[&str]) {
        self.console.notify(&parts.join(" "));
    }
}

/// The Surge capability set.
#[derive(Clone)]
pub struct SurgeEnvironment {
    pub http_client: HttpClient,
    pub persistent_store: PersistentStore,
    pub notification: Notification,
}

impl SurgeEnvironment {
    pub fn new(primitives: &SharedPrimitives, console: ConsoleHandle) -> Self {
        Self {
            http_client: HttpClient::new(primitives.network.clone(), console.clone()),
            persistent_store: PersistentStore::new(primitives.store.clone()),
            notification: Notification::new(console),
        }
    }
}

impl EnvironmentAdapter for SurgeEnvironment {
    fn kind(&self) -> EnvironmentKind {
        EnvironmentKind::Surge
    }

    fn surface(&self) -> &'static [&'static str] {
        SURGE_SURFACE
    }

    fn notify(&self, parts: &[&str]) {
        self.notification.post(parts);
    }
}
