//! CLI module for caserec
//!
//! This module contains all CLI command handlers and utilities.

mod commands;
mod logging;

pub use commands::{run_command, EXIT_INVALID, EXIT_NO_NEW_DATA, EXIT_SUCCESS};
pub use logging::init_tracing;

// Re-export Cli from config for convenience
pub use crate::config::cli::Cli;
