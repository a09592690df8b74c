//! Module whitelist
//!
//! Scripts may ask for extra modules by name. Only names registered here
//! resolve; anything else is a configuration error at build time.

use crate::error::ContextError;
use crate::normalize::{parse_form, stringify_form};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A module attachable to a context under its own name.
pub trait ScriptModule: Send + Sync {
    fn name(&self) -> &str;

    /// Methods the module answers to.
    fn methods(&self) -> &'static [&'static str];

    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, ContextError>;
}

/// Constructor for a permitted module.
pub type ModuleFactory = Arc<dyn Fn() -> Arc<dyn ScriptModule> + Send + Sync>;

/// Registry mapping permitted module names to constructors.
#[derive(Clone)]
pub struct ModuleRegistry {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleRegistry {
    /// Create an empty registry. No module resolves.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the built-in modules (`qs`).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(QsModule::NAME, || Arc::new(QsModule) as Arc<dyn ScriptModule>);
        registry
    }

    /// Permit `name`, replacing any earlier registration.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn ScriptModule> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Permitted names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Construct the module registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ScriptModule>, ContextError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ContextError::ModuleNotFound(name.to_string()))
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Query-string helpers: `qs.parse(text)` and `qs.stringify(object)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QsModule;

impl QsModule {
    pub const NAME: &'static str = "qs";
}

impl ScriptModule for QsModule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn methods(&self) -> &'static [&'static str] {
        &["parse", "stringify"]
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, ContextError> {
        let call_error = |message: String| ContextError::ModuleCall {
            module: Self::NAME.to_string(),
            method: method.to_string(),
            message,
        };
        match method {
            "parse" => match args.first() {
                Some(Value::String(text)) => Ok(parse_form(text)),
                Some(Value::Null) | None => Ok(parse_form("")),
                Some(other) => Err(call_error(format!("expected a string, got {}", other))),
            },
            "stringify" => match args.first() {
                Some(value @ Value::Object(_)) => Ok(Value::String(stringify_form(value))),
                Some(Value::Null) | None => Ok(Value::String(String::new())),
                Some(other) => Err(call_error(format!("expected an object, got {}", other))),
            },
            other => Err(call_error(format!("unknown method '{}'", other))),
        }
    }
}
