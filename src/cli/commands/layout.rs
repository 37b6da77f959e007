//! Layout command implementation

use super::{print_json, Context, EXIT_SUCCESS};
use crate::config::cli::{LayoutAction, LayoutArgs};
use crate::config::OutputFormat;
use serde_json::Value as Json;
use std::fs;

pub fn run_layout(ctx: &Context, args: LayoutArgs) -> Result<u8, String> {
    match args.action {
        LayoutAction::Get(args) => {
            let recording = ctx.open(&args.file)?;
            let layouts =
                recording.get_layout().map_err(|e| format!("Failed to read layout: {e}"))?;
            match (ctx.format, layouts.first()) {
                (OutputFormat::Text, None) => eprintln!("No layout stored"),
                (OutputFormat::Text, Some(layout)) => print_json(layout)?,
                (OutputFormat::Json, _) => print_json(&layouts)?,
            }
        }
        LayoutAction::Set(args) => {
            let document = parse_document(&args.document)?;
            let recording = ctx.open(&args.file)?;
            recording
                .set_layout(&document)
                .map_err(|e| format!("Failed to store layout: {e}"))?;
            if ctx.format == OutputFormat::Text {
                println!("✓ Layout stored in {}", args.file.display());
            }
        }
    }
    Ok(EXIT_SUCCESS)
}

/// Parse inline JSON, or read it from a file when prefixed with `@`.
pub(crate) fn parse_document(arg: &str) -> Result<Json, String> {
    let text = match arg.strip_prefix('@') {
        Some(path) => {
            fs::read_to_string(path).map_err(|e| format!("Failed to read {path}: {e}"))?
        }
        None => arg.to_string(),
    };
    serde_json::from_str(&text).map_err(|e| format!("Invalid layout JSON: {e}"))
}
