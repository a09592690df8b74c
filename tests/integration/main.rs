//! Integration tests for the script context layer

mod cli_commands;
mod quanx_adapter;
mod support;
mod surge_adapter;
