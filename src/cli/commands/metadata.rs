//! Metadata command implementation

use super::{print_json, Context, EXIT_SUCCESS};
use crate::config::cli::FileArgs;
use crate::config::OutputFormat;

pub fn run_metadata(ctx: &Context, args: &FileArgs) -> Result<u8, String> {
    let recording = ctx.open(&args.file)?;
    let records = recording
        .get_driver_metadata()
        .map_err(|e| format!("Failed to read driver metadata: {e}"))?;

    match (ctx.format, records.first()) {
        (OutputFormat::Json, _) => print_json(&records)?,
        (OutputFormat::Text, None) => eprintln!("No driver metadata recorded"),
        (OutputFormat::Text, Some(record)) => {
            println!("model_viewer_data:");
            print_json(&record.model_viewer_data)?;
        }
    }
    Ok(EXIT_SUCCESS)
}
