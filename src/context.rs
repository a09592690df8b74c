//! Script context
//!
//! A [`ScriptContext`] is the capability set handed to one script: the shared
//! primitives, at most one environment adapter, any whitelisted modules and
//! caller overrides. Name lookup follows override > module > adapter >
//! shared.

pub mod builder;
pub mod modules;

pub use builder::{ContextBuilder, ContextOptions, RequireSpec};
pub use modules::{ModuleFactory, ModuleRegistry, QsModule, ScriptModule};

use crate::adapter::{
    build_request, Environment, EnvironmentKind, HttpClient, Notification, PersistentStore, Prefs,
    Task,
};
use crate::console::ConsoleHandle;
use crate::error::{ContextError, TransportError};
use crate::primitives::{Feed, HttpRequester, SharedPrimitives, StoreHandle, SHARED_SURFACE};
use crate::types::{Response, ScriptRequest};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// What a surface name is bound to.
#[derive(Clone)]
pub enum Binding<'a> {
    Shared(&'static str),
    Adapter(EnvironmentKind, &'static str),
    Module(&'a Arc<dyn ScriptModule>),
    Override(&'a Value),
}

impl Binding<'_> {
    pub fn describe(&self) -> String {
        match self {
            Binding::Shared(_) => "shared".to_string(),
            Binding::Adapter(kind, _) => format!("adapter ({})", kind),
            Binding::Module(module) => format!("module ({})", module.methods().join(", ")),
            Binding::Override(value) => format!("override ({})", crate::types::value_kind(value)),
        }
    }
}

/// A configured context. Produced by [`ContextBuilder::build`].
pub struct ScriptContext {
    pub(crate) primitives: SharedPrimitives,
    pub(crate) environment: Environment,
    pub(crate) modules: BTreeMap<String, Arc<dyn ScriptModule>>,
    pub(crate) overrides: Map<String, Value>,
    pub(crate) console: ConsoleHandle,
    pub(crate) registry: Arc<ModuleRegistry>,
}

impl ScriptContext {
    pub fn environment_kind(&self) -> EnvironmentKind {
        self.environment.kind()
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// `setTimeout(callback, delay_ms)`. `false` when no runtime is running.
    pub fn set_timeout<F>(&self, callback: F, delay_ms: u64) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.primitives.timer.schedule(delay_ms, callback)
    }

    /// `$axios`
    pub fn axios(&self) -> &HttpRequester {
        &self.primitives.network
    }

    /// `$axios(req)`: normalize `req` and issue it. The method defaults to GET.
    pub async fn request(&self, req: ScriptRequest) -> Result<Response, TransportError> {
        let method = req
            .method
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or("GET")
            .to_uppercase();
        self.primitives
            .network
            .request(build_request(&req, &method))
            .await
    }

    /// `$store`
    pub fn store(&self) -> &StoreHandle {
        &self.primitives.store
    }

    /// `$feed`
    pub fn feed(&self) -> &Feed {
        &self.primitives.feed
    }

    pub fn console(&self) -> &ConsoleHandle {
        &self.console
    }

    /// `$httpClient`, unless Surge is not selected or the name is shadowed.
    pub fn http_client(&self) -> Option<&HttpClient> {
        match &self.environment {
            Environment::Surge(env) if !self.shadowed("$httpClient") => Some(&env.http_client),
            _ => None,
        }
    }

    /// `$persistentStore`
    pub fn persistent_store(&self) -> Option<&PersistentStore> {
        match &self.environment {
            Environment::Surge(env) if !self.shadowed("$persistentStore") => {
                Some(&env.persistent_store)
            }
            _ => None,
        }
    }

    /// `$notification`
    pub fn notification(&self) -> Option<&Notification> {
        match &self.environment {
            Environment::Surge(env) if !self.shadowed("$notification") => Some(&env.notification),
            _ => None,
        }
    }

    /// `$task`
    pub fn task(&self) -> Option<&Task> {
        match &self.environment {
            Environment::QuantumultX(env) if !self.shadowed("$task") => Some(&env.task),
            _ => None,
        }
    }

    /// `$prefs`
    pub fn prefs(&self) -> Option<&Prefs> {
        match &self.environment {
            Environment::QuantumultX(env) if !self.shadowed("$prefs") => Some(&env.prefs),
            _ => None,
        }
    }

    /// Send a notification through the adapter's native entry point
    /// (`$notification.post` or `$notify`). Returns false when there is no
    /// adapter or the entry point is overridden.
    pub fn notify(&self, parts: &[&str]) -> bool {
        let name = match self.environment_kind() {
            EnvironmentKind::None => return false,
            EnvironmentKind::Surge => "$notification",
            EnvironmentKind::QuantumultX => "$notify",
        };
        match self.environment.adapter() {
            Some(adapter) if !self.shadowed(name) => {
                adapter.notify(parts);
                true
            }
            _ => false,
        }
    }

    /// `$done(data)`: the normalized completion signal, or `None` when no
    /// adapter supplies `$done` or it is overridden.
    pub fn done(&self, data: Option<Value>) -> Option<Value> {
        if self.shadowed("$done") {
            return None;
        }
        self.environment.adapter().map(|adapter| adapter.done(data))
    }

    pub fn module(&self, name: &str) -> Option<&Arc<dyn ScriptModule>> {
        if self.overrides.contains_key(name) {
            return None;
        }
        self.modules.get(name)
    }

    pub fn override_value(&self, name: &str) -> Option<&Value> {
        self.overrides.get(name)
    }

    /// Resolve `name` to its effective binding.
    pub fn resolve(&self, name: &str) -> Option<Binding<'_>> {
        if let Some(value) = self.overrides.get(name) {
            return Some(Binding::Override(value));
        }
        if let Some(module) = self.modules.get(name) {
            return Some(Binding::Module(module));
        }
        if let Some(entry) = self.environment.surface().iter().find(|n| **n == name) {
            return Some(Binding::Adapter(self.environment_kind(), *entry));
        }
        SHARED_SURFACE
            .iter()
            .find(|n| **n == name)
            .map(|entry| Binding::Shared(*entry))
    }

    pub fn exposes(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Every exposed name, sorted.
    pub fn surface(&self) -> Vec<String> {
        let names: BTreeSet<&str> = SHARED_SURFACE
            .iter()
            .chain(self.environment.surface())
            .copied()
            .chain(self.modules.keys().map(String::as_str))
            .chain(self.overrides.keys().map(String::as_str))
            .collect();
        names.into_iter().map(str::to_string).collect()
    }

    /// Attach more modules and overrides to a configured context.
    ///
    /// The adapter chosen at build time is kept; `surge`/`quanx` flags are
    /// ignored. On an unknown module name nothing is applied.
    pub fn extend(&mut self, options: ContextOptions) -> Result<(), ContextError> {
        if options.surge || options.quanx {
            self.console.debug(&format!(
                "environment already selected ({}); ignoring adapter flags",
                self.environment_kind()
            ));
        }
        self.apply(options.require.as_ref(), options.add_context)
    }

    pub(crate) fn apply(
        &mut self,
        require: Option<&RequireSpec>,
        overrides: Option<Map<String, Value>>,
    ) -> Result<(), ContextError> {
        let mut resolved = Vec::new();
        for name in require.map(RequireSpec::names).unwrap_or_default() {
            resolved.push((name.to_string(), self.registry.resolve(name)?));
        }
        for (name, module) in resolved {
            self.console.debug(&format!("module {} attached", name));
            self.modules.insert(name, module);
        }
        if let Some(overrides) = overrides {
            self.overrides.extend(overrides);
        }
        Ok(())
    }

    fn shadowed(&self, name: &str) -> bool {
        self.overrides.contains_key(name) || self.modules.contains_key(name)
    }
}
