//! caserec CLI
//!
//! # Usage
//!
//! ```bash
//! # Check a file before reading it
//! caserec validate cases.sql
//!
//! # Classified iterations as JSON
//! caserec iterations cases.sql --format json
//!
//! # Change detection (exit 0 = new data, 2 = none)
//! caserec poll cases.sql --since 42
//! ```

use clap::Parser;
use caserec::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
