//! Tooling & Integration Layer
//!
//! Command-line access to the context builder and its primitives.

pub mod cli;

pub use cli::{Cli, CliContext, Commands, ConfigCommands, StoreCommands};
