//! CLI command implementations

mod get;
mod iterations;
mod layout;
mod metadata;
mod poll;
mod validate;
mod variables;

#[cfg(test)]
mod tests;

use crate::cli::logging::init_tracing;
use crate::config::cli::{Cli, Command};
use crate::config::{load_config, OutputFormat, ReaderConfig};
use crate::recording::RecordingFile;
use serde::Serialize;
use std::path::Path;

pub const EXIT_SUCCESS: u8 = 0;
/// Validation failed.
pub const EXIT_INVALID: u8 = 1;
/// `poll` found nothing newer.
pub const EXIT_NO_NEW_DATA: u8 = 2;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub(crate) struct Context {
    pub config: ReaderConfig,
    pub format: OutputFormat,
}

impl Context {
    /// Open `file` or explain why it is not a recording.
    pub fn open(&self, file: &Path) -> Result<RecordingFile, String> {
        let mut recording = RecordingFile::with_config(self.config.clone());
        match recording.connect(file) {
            Ok(true) => Ok(recording),
            Ok(false) => Err(format!(
                "{} is not a SQLite recording (run `caserec validate` for details)",
                file.display()
            )),
            Err(e) => Err(format!("Failed to open {}: {e}", file.display())),
        }
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("JSON serialization failed: {e}"))?;
    println!("{json}");
    Ok(())
}

/// Execute a CLI command and return the process exit code
pub fn run_command(cli: Cli) -> Result<u8, String> {
    let config = match &cli.config {
        Some(path) => load_config(path).map_err(|e| e.to_string())?,
        None => ReaderConfig::default(),
    };
    init_tracing(cli.log_level.as_deref().unwrap_or(&config.log_level));

    let ctx = Context { format: cli.format.unwrap_or(config.format), config };

    match cli.command {
        Command::Validate(args) => validate::run_validate(&ctx, &args),
        Command::Iterations(args) => iterations::run_iterations(&ctx, &args),
        Command::Metadata(args) => metadata::run_metadata(&ctx, &args),
        Command::Variables(args) => variables::run_variables(&ctx, &args),
        Command::Layout(args) => layout::run_layout(&ctx, args),
        Command::Poll(args) => poll::run_poll(&ctx, &args),
        Command::Get(args) => get::run_get(&ctx, &args),
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}
