//! Quantumult X-style environment.
//!
//! Exposes `$task.fetch` (callback and promise), `$prefs`, `$notify` and
//! `$done`.

use super::{build_request, guard_callback, CallbackResult, EnvironmentAdapter, EnvironmentKind};
use crate::console::ConsoleHandle;
use crate::error::TransportError;
use crate::primitives::{HttpRequester, SharedPrimitives, StoreHandle};
use crate::types::{HeaderMap, ScriptRequest};
use futures::channel::oneshot;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::runtime::Handle;

pub const QUANX_SURFACE: &[&str] = &["$task", "$prefs", "$notify", "$done"];

/// Successful `$task.fetch` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub status_code: u16,
    pub headers: HeaderMap,
    pub body: String,
}

/// Rejection value of the `$task.fetch` promise: `{ error: text }`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{error}")]
pub struct FetchRejection {
    pub error: String,
}

/// What the fetch callback observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchEvent<'a> {
    Response(&'a FetchResult),
    Error(&'a str),
}

type FetchCallback = Box<dyn FnOnce(FetchEvent<'_>) -> CallbackResult + Send>;
type FetchOutcome = Result<FetchResult, FetchRejection>;

/// Single completion event fanned out to the callback and the promise.
///
/// `complete` consumes the fan-out, so each observer fires exactly once and
/// both see the same outcome.
struct FetchCompletion {
    callback: Option<FetchCallback>,
    promise: oneshot::Sender<FetchOutcome>,
    console: ConsoleHandle,
}

impl FetchCompletion {
    fn complete(self, outcome: Result<FetchResult, String>) {
        if let Some(callback) = self.callback {
            let event = match &outcome {
                Ok(result) => FetchEvent::Response(result),
                Err(text) => FetchEvent::Error(text),
            };
            guard_callback(self.console.as_ref(), "$task.fetch", || callback(event));
        }
        // The script may have dropped the promise.
        let _ = self
            .promise
            .send(outcome.map_err(|error| FetchRejection { error }));
    }
}

/// Promise side of `$task.fetch`.
///
/// The request runs whether or not this is awaited.
#[must_use = "dropping the promise does not cancel the request, but its outcome is lost"]
pub struct FetchPromise {
    rx: oneshot::Receiver<FetchOutcome>,
}

impl Future for FetchPromise {
    type Output = FetchOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(FetchRejection {
                error: "fetch task ended without a result".to_string(),
            })),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// `$task`
#[derive(Clone)]
pub struct Task {
    network: HttpRequester,
    console: ConsoleHandle,
}

impl Task {
    pub fn new(network: HttpRequester, console: ConsoleHandle) -> Self {
        Self { network, console }
    }

    /// `$task.fetch(req)` without a callback.
    pub fn fetch(&self, req: ScriptRequest) -> FetchPromise {
        self.dispatch(req, None)
    }

    /// `$task.fetch(req, cb)`: `cb` and the returned promise both observe
    /// the outcome.
    ///
    /// Outside a tokio runtime the fetch fails immediately and both observe
    /// the rejection.
    pub fn fetch_with<F>(&self, req: ScriptRequest, callback: F) -> FetchPromise
    where
        F: FnOnce(FetchEvent<'_>) -> CallbackResult + Send + 'static,
    {
        self.dispatch(req, Some(Box::new(callback)))
    }

    fn dispatch(&self, req: ScriptRequest, callback: Option<FetchCallback>) -> FetchPromise {
        let method = req
            .method
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or("GET")
            .to_uppercase();
        let request = build_request(&req, &method);
        let (tx, rx) = oneshot::channel();
        let completion = FetchCompletion {
            callback,
            promise: tx,
            console: self.console.clone(),
        };
        let network = self.network.clone();
        let console = self.console.clone();

        let Ok(handle) = Handle::try_current() else {
            let text = TransportError::NoRuntime.to_string();
            console.error(&text);
            completion.complete(Err(text));
            return FetchPromise { rx };
        };

        handle.spawn(async move {
            let outcome = match network.request(request).await {
                Ok(response) => Ok(FetchResult {
                    status_code: response.status,
                    headers: response.headers,
                    body: response.body,
                }),
                Err(e) => {
                    let text = e.to_string();
                    console.error(&text);
                    Err(text)
                }
            };
            completion.complete(outcome);
        });

        FetchPromise { rx }
    }
}

/// `$prefs`
#[derive(Clone)]
pub struct Prefs {
    store: StoreHandle,
}

impl Prefs {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    pub fn value_for_key(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    pub fn set_value_for_key(&self, value: &str, key: &str) -> bool {
        self.store.put(value, key)
    }
}

/// The Quantumult X capability set.
#[derive(Clone)]
pub struct QuanxEnvironment {
    pub task: Task,
    pub prefs: Prefs,
    console: ConsoleHandle,
}

impl QuanxEnvironment {
    pub fn new(primitives: &SharedPrimitives, console: ConsoleHandle) -> Self {
        Self {
            task: Task::new(primitives.network.clone(), console.clone()),
            prefs: Prefs::new(primitives.store.clone()),
            console,
        }
    }
}

impl EnvironmentAdapter for QuanxEnvironment {
    fn kind(&self) -> EnvironmentKind {
        EnvironmentKind::QuantumultX
    }

    fn surface(&self) -> &'static [&'static str] {
        QUANX_SURFACE
    }

    /// `$notify(title, subtitle, body, ...)`
    fn notify(&self, parts: &[&str]) {
        self.console.notify(&parts.join(" "));
    }
}
