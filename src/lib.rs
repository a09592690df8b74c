//! Scriptshim: a compatibility layer for proxy-app automation scripts
//!
//! Builds a per-script [`ScriptContext`] that exposes one common set of
//! primitives (timer, HTTP, key/value store, push feed) plus the native API
//! shape of one host environment, Surge or Quantumult X, so a script written
//! against either host runs unchanged.

pub mod adapter;
pub mod config;
pub mod console;
pub mod context;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod primitives;
pub mod tooling;
pub mod types;

pub use adapter::{Environment, EnvironmentAdapter, EnvironmentKind};
pub use config::{ConfigLoader, ContextConfig};
pub use console::{ConsoleHandle, ScriptConsole, TracingConsole};
pub use context::{Binding, ContextBuilder, ContextOptions, ScriptContext};
pub use error::{ContextError, HeaderError, TransportError};
pub use types::{RawHeaders, Request, Response, ScriptRequest};
