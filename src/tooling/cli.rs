//! CLI Tooling
//!
//! Command-line access to a script context: inspect the surface an
//! environment exposes, read and write the persistent store, issue one
//! `$axios` request and print the effective configuration.

use crate::adapter::EnvironmentKind;
use crate::config::{ConfigLoader, ContextConfig};
use crate::context::{ContextBuilder, ContextOptions, RequireSpec, ScriptContext};
use crate::error::ContextError;
use crate::logging::LoggingConfig;
use crate::types::ScriptRequest;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use serde_json::Value;
use std::path::PathBuf;

/// Scriptshim CLI - run proxy-app script primitives from the shell
#[derive(Parser)]
#[command(name = "scriptshim")]
#[command(about = "Surge / Quantumult X script context tooling")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// `base` with any logging flags applied on top.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut logging = base.clone();
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            logging.file = Some(file.clone());
        }
        logging
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the names a context exposes for an environment
    Surface {
        /// Environment to emulate
        #[arg(long, value_enum, default_value_t = EnvironmentKind::None)]
        env: EnvironmentKind,
        /// Modules to attach (repeatable)
        #[arg(long)]
        require: Vec<String>,
    },
    /// Read or write the persistent store
    Store {
        #[command(subcommand)]
        command: StoreCommands,
    },
    /// Issue one request through the shared network primitive
    Request {
        url: String,
        /// HTTP method
        #[arg(long, short = 'X', default_value = "GET")]
        method: String,
        /// Header as "Name: value" (repeatable)
        #[arg(long = "header", short = 'H')]
        headers: Vec<String>,
        /// Request body
        #[arg(long, short = 'd')]
        data: Option<String>,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum StoreCommands {
    /// Print the value stored under a key
    Get { key: String },
    /// Store a value under a key
    Put { key: String, value: String },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
}

/// CLI context holding the loaded configuration and context builder
pub struct CliContext {
    builder: ContextBuilder,
}

impl CliContext {
    /// Create a new CLI context
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ContextError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        Ok(Self {
            builder: ContextBuilder::from_config(config)?,
        })
    }

    pub fn config(&self) -> &ContextConfig {
        self.builder.config()
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ContextError> {
        match command {
            Commands::Surface { env, require } => self.handle_surface(*env, require),
            Commands::Store { command } => self.handle_store_command(command),
            Commands::Request {
                url,
                method,
                headers,
                data,
            } => self.handle_request(url, method, headers, data.as_deref()),
            Commands::Config { command } => match command {
                ConfigCommands::Show => self.config().to_toml(),
            },
        }
    }

    fn handle_surface(
        &self,
        env: EnvironmentKind,
        require: &[String],
    ) -> Result<String, ContextError> {
        let mut options = match env {
            EnvironmentKind::None => ContextOptions::default(),
            EnvironmentKind::Surge => ContextOptions::surge(),
            EnvironmentKind::QuantumultX => ContextOptions::quanx(),
        };
        if !require.is_empty() {
            options.require = Some(RequireSpec::Many(require.to_vec()));
        }
        let context = self.builder.build(options)?;
        Ok(format_surface(&context))
    }

    fn handle_store_command(&self, command: &StoreCommands) -> Result<String, ContextError> {
        let store = &self.builder.primitives().store;
        match command {
            StoreCommands::Get { key } => store
                .get(key)
                .ok_or_else(|| ContextError::ConfigError(format!("No value stored for '{}'", key))),
            StoreCommands::Put { key, value } => {
                if store.put(value, key) {
                    Ok(format!("Stored '{}'", key))
                } else {
                    Err(ContextError::ConfigError(format!(
                        "Failed to store value for '{}'",
                        key
                    )))
                }
            }
        }
    }

    fn handle_request(
        &self,
        url: &str,
        method: &str,
        headers: &[String],
        data: Option<&str>,
    ) -> Result<String, ContextError> {
        let mut req = ScriptRequest::new(url).with_method(method);
        for header in headers {
            let (name, value) = header.split_once(':').ok_or_else(|| {
                ContextError::ConfigError(format!(
                    "Invalid header '{}' (expected \"Name: value\")",
                    header
                ))
            })?;
            req = req.with_header(name.trim(), value.trim());
        }
        if let Some(data) = data {
            req = req.with_body(Value::String(data.to_string()));
        }

        let context = self.builder.build(ContextOptions::default())?;
        let rt = tokio::runtime::Runtime::new().map_err(|e| {
            ContextError::ConfigError(format!("Failed to create tokio runtime: {}", e))
        })?;
        let response = rt.block_on(context.request(req))?;

        let mut output = format!("Status: {}\n", response.status);
        for (name, value) in &response.headers {
            output.push_str(&format!("{}: {}\n", name, value));
        }
        output.push('\n');
        output.push_str(&response.body);
        Ok(output)
    }
}

fn format_surface(context: &ScriptContext) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Name", "Binding"]);
    for name in context.surface() {
        let binding = context
            .resolve(&name)
            .map(|b| b.describe())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![name, binding]);
    }
    format!("Environment: {}\n{}", context.environment_kind(), table)
}
