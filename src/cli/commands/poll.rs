//! Poll command implementation

use super::{print_json, Context, EXIT_NO_NEW_DATA, EXIT_SUCCESS};
use crate::config::cli::PollArgs;
use crate::config::OutputFormat;
use serde_json::json;

pub fn run_poll(ctx: &Context, args: &PollArgs) -> Result<u8, String> {
    let recording = ctx.open(&args.file)?;
    let fresh = recording
        .is_new_data(args.since)
        .map_err(|e| format!("Failed to poll {}: {e}", args.file.display()))?;

    match ctx.format {
        OutputFormat::Json => print_json(&json!({"since": args.since, "new_data": fresh}))?,
        OutputFormat::Text if fresh => println!("New iterations after counter {}", args.since),
        OutputFormat::Text => println!("No iterations after counter {}", args.since),
    }
    Ok(if fresh { EXIT_SUCCESS } else { EXIT_NO_NEW_DATA })
}
