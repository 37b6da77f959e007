//! Core CLI types - Cli, Command, and argument structs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::collections::Collection;
use crate::config::OutputFormat;

/// caserec: read optimization case recordings
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "caserec")]
#[command(version)]
#[command(about = "Inspect SQLite case recordings: iterations, metadata and layouts")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// YAML reader configuration
    #[arg(short, long, global = true, env = "CASEREC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter (error, warn, info, debug, trace); overrides the config file
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format (text, json); overrides the config file
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Check that a file is a SQLite recording
    Validate(FileArgs),

    /// Print classified iteration records
    Iterations(IterationsArgs),

    /// Print the driver metadata payload
    Metadata(FileArgs),

    /// Print name maps and the variables of the first iteration
    Variables(FileArgs),

    /// Read or replace the stored layout
    Layout(LayoutArgs),

    /// Check for iterations newer than a counter
    Poll(PollArgs),

    /// Read a named collection
    Get(GetArgs),
}

/// Arguments for commands that take only a recording
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct FileArgs {
    /// Path to the recording file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for the iterations command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct IterationsArgs {
    /// Path to the recording file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Only the first iteration
    #[arg(long)]
    pub first: bool,
}

/// Arguments for the layout command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct LayoutArgs {
    #[command(subcommand)]
    pub action: LayoutAction,
}

/// Layout operations
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum LayoutAction {
    /// Print the stored layout
    Get(FileArgs),

    /// Replace the stored layout
    Set(LayoutSetArgs),
}

/// Arguments for `layout set`
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct LayoutSetArgs {
    /// Path to the recording file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// JSON document, or @path to read it from a file
    #[arg(value_name = "JSON")]
    pub document: String,
}

/// Arguments for the poll command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct PollArgs {
    /// Path to the recording file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Last counter already seen
    #[arg(long, allow_negative_numbers = true)]
    pub since: i64,
}

/// Arguments for the get command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct GetArgs {
    /// Path to the recording file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Collection name (driver_iterations, driver_metadata, layouts, metadata)
    #[arg(value_name = "COLLECTION")]
    pub collection: Collection,

    /// Only the first record
    #[arg(long)]
    pub first: bool,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
