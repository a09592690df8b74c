//! Context Builder
//!
//! `ContextBuilder` is the unconfigured state; [`ContextBuilder::build`]
//! applies adapter selection, module injection and overrides, in that order,
//! and yields the configured [`ScriptContext`].

use super::modules::ModuleRegistry;
use super::ScriptContext;
use crate::adapter::Environment;
use crate::config::ContextConfig;
use crate::console::{default_console, ConsoleHandle};
use crate::error::ContextError;
use crate::primitives::{
    Feed, FeedSink, FileStore, HttpRequester, HttpTransport, LoggingFeedSink, ReqwestTransport,
    SharedPrimitives, StoreHandle,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One module name or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequireSpec {
    One(String),
    Many(Vec<String>),
}

impl RequireSpec {
    pub fn names(&self) -> Vec<&str> {
        match self {
            RequireSpec::One(name) => vec![name.as_str()],
            RequireSpec::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for RequireSpec {
    fn from(name: &str) -> Self {
        RequireSpec::One(name.to_string())
    }
}

impl From<Vec<String>> for RequireSpec {
    fn from(names: Vec<String>) -> Self {
        RequireSpec::Many(names)
    }
}

/// Builder input: `{ surge, quanx, addContext, require }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextOptions {
    #[serde(default)]
    pub surge: bool,
    #[serde(default)]
    pub quanx: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_context: Option<Map<String, Value>>,
    #[serde(default, alias = "$require", skip_serializing_if = "Option::is_none")]
    pub require: Option<RequireSpec>,
}

impl ContextOptions {
    pub fn surge() -> Self {
        Self {
            surge: true,
            ..Default::default()
        }
    }

    pub fn quanx() -> Self {
        Self {
            quanx: true,
            ..Default::default()
        }
    }

    pub fn require(mut self, spec: impl Into<RequireSpec>) -> Self {
        self.require = Some(spec.into());
        self
    }

    pub fn add_context(mut self, name: impl Into<String>, value: Value) -> Self {
        self.add_context
            .get_or_insert_with(Map::new)
            .insert(name.into(), value);
        self
    }
}

/// Produces one [`ScriptContext`] per script invocation.
///
/// Cheap to clone; every context built from the same builder shares its
/// transport, store and feed.
#[derive(Clone)]
pub struct ContextBuilder {
    config: ContextConfig,
    primitives: SharedPrimitives,
    console: ConsoleHandle,
    registry: Arc<ModuleRegistry>,
}

impl ContextBuilder {
    /// Builder over the default collaborators: `reqwest` transport, file
    /// store at the configured directory and a logging feed sink.
    pub fn from_config(config: ContextConfig) -> Result<Self, ContextError> {
        config.validate()?;
        let transport = Arc::new(ReqwestTransport::new()?);
        let store = Arc::new(FileStore::open(config.store.resolve_dir()?)?);
        Ok(Self::with_parts(
            config,
            transport,
            store,
            Arc::new(LoggingFeedSink),
        ))
    }

    /// Builder over caller-supplied collaborators.
    pub fn with_parts(
        config: ContextConfig,
        transport: Arc<dyn HttpTransport>,
        store: StoreHandle,
        feed: Arc<dyn FeedSink>,
    ) -> Self {
        let network = HttpRequester::new(transport, config.timeout_ms);
        Self {
            primitives: SharedPrimitives::new(network, store, Feed::new(feed)),
            config,
            console: default_console(),
            registry: Arc::new(ModuleRegistry::with_builtins()),
        }
    }

    pub fn with_console(mut self, console: ConsoleHandle) -> Self {
        self.console = console;
        self
    }

    pub fn with_registry(mut self, registry: ModuleRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn primitives(&self) -> &SharedPrimitives {
        &self.primitives
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Build a configured context.
    ///
    /// Fails only when a required module is not on the whitelist; no
    /// partially built context is returned.
    pub fn build(&self, options: ContextOptions) -> Result<ScriptContext, ContextError> {
        let environment = Environment::select(
            options.surge,
            options.quanx,
            &self.primitives,
            &self.console,
        );

        let mut context = ScriptContext {
            primitives: self.primitives.clone(),
            environment,
            modules: BTreeMap::new(),
            overrides: Map::new(),
            console: self.console.clone(),
            registry: self.registry.clone(),
        };
        context.apply(options.require.as_ref(), options.add_context)?;
        Ok(context)
    }
}
