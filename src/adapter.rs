//! Environment adapters
//!
//! An adapter translates the shared primitives into one host environment's
//! native capability shapes. A context carries exactly one
//! [`Environment`], chosen once when it is built.

pub mod quanx;
pub mod surge;

pub use quanx::{
    FetchEvent, FetchPromise, FetchRejection, FetchResult, Prefs, QuanxEnvironment, Task,
};
pub use surge::{CallHandle, HttpClient, Notification, PersistentStore, SurgeEnvironment};

use crate::console::{ConsoleHandle, ScriptConsole};
use crate::normalize::{normalize_body, normalize_completion, normalize_headers};
use crate::primitives::SharedPrimitives;
use crate::types::{Request, ScriptRequest};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;

/// What a script callback returns. Errors are logged, never propagated.
pub type CallbackResult = anyhow::Result<()>;

/// Which host environment a context emulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum EnvironmentKind {
    /// Shared surface only.
    None,
    /// Surge-style `$httpClient` / `$persistentStore` / `$notification`.
    Surge,
    /// Quantumult X-style `$task` / `$prefs` / `$notify`.
    #[value(name = "quanx")]
    QuantumultX,
}

impl fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnvironmentKind::None => "none",
            EnvironmentKind::Surge => "surge",
            EnvironmentKind::QuantumultX => "quanx",
        };
        f.write_str(name)
    }
}

/// Capability interface every adapter implements.
pub trait EnvironmentAdapter: Send + Sync {
    fn kind(&self) -> EnvironmentKind;

    /// Names this adapter adds to the context surface.
    fn surface(&self) -> &'static [&'static str];

    /// Join `parts` with single spaces and forward them as a notification.
    fn notify(&self, parts: &[&str]);

    /// Normalize a completion signal (`$done`).
    fn done(&self, data: Option<Value>) -> Value {
        normalize_completion(data)
    }
}

/// The adapter merged into a context.
pub enum Environment {
    None,
    Surge(SurgeEnvironment),
    QuantumultX(QuanxEnvironment),
}

impl Environment {
    /// Pick the adapter for the given flags. Surge wins when both are set.
    pub fn select(
        surge: bool,
        quanx: bool,
        primitives: &SharedPrimitives,
        console: &ConsoleHandle,
    ) -> Self {
        if surge {
            console.debug("surge compatibility mode enabled");
            Environment::Surge(SurgeEnvironment::new(primitives, console.clone()))
        } else if quanx {
            console.debug("quanx compatibility mode enabled");
            Environment::QuantumultX(QuanxEnvironment::new(primitives, console.clone()))
        } else {
            Environment::None
        }
    }

    pub fn kind(&self) -> EnvironmentKind {
        match self {
            Environment::None => EnvironmentKind::None,
            Environment::Surge(_) => EnvironmentKind::Surge,
            Environment::QuantumultX(_) => EnvironmentKind::QuantumultX,
        }
    }

    pub fn adapter(&self) -> Option<&dyn EnvironmentAdapter> {
        match self {
            Environment::None => None,
            Environment::Surge(env) => Some(env),
            Environment::QuantumultX(env) => Some(env),
        }
    }

    pub fn surface(&self) -> &'static [&'static str] {
        self.adapter().map(|a| a.surface()).unwrap_or(&[])
    }
}

/// Build the shared request shape from a script request.
pub(crate) fn build_request(req: &ScriptRequest, method: &str) -> Request {
    Request {
        url: req.url.clone(),
        headers: normalize_headers(req.headers.as_ref()),
        body: normalize_body(req),
        method: method.to_string(),
        timeout_ms: 0,
    }
}

/// Run a script callback, logging an error return or a panic.
pub(crate) fn guard_callback<F>(console: &dyn ScriptConsole, label: &str, call: F)
where
    F: FnOnce() -> CallbackResult,
{
    match std::panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => console.error(&format!("{} cb error: {:#}", label, e)),
        Err(payload) => console.error(&format!(
            "{} cb panicked: {}",
            label,
            panic_message(payload.as_ref())
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
