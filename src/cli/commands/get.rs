//! Generic collection read

use super::{print_json, Context, EXIT_SUCCESS};
use crate::collections::CaseSource;
use crate::config::cli::GetArgs;

pub fn run_get(ctx: &Context, args: &GetArgs) -> Result<u8, String> {
    let recording = ctx.open(&args.file)?;
    let documents = recording
        .generic_get(args.collection, !args.first)
        .map_err(|e| format!("Failed to read {}: {e}", args.collection))?;

    // Collections are JSON documents; text output is the same JSON.
    print_json(&documents)?;
    Ok(EXIT_SUCCESS)
}
