//! Reader configuration and command-line arguments.

pub mod cli;
mod loader;
mod schema;

pub use loader::load_config;
pub use schema::{OutputFormat, ReaderConfig, MAX_BUSY_TIMEOUT_MS};
