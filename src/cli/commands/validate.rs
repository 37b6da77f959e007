//! Validate command implementation

use super::{print_json, Context, EXIT_INVALID, EXIT_SUCCESS};
use crate::config::cli::FileArgs;
use crate::config::OutputFormat;
use crate::recording::FormatValidator;
use serde_json::json;

pub fn run_validate(ctx: &Context, args: &FileArgs) -> Result<u8, String> {
    let report = FormatValidator::new().inspect(&args.file);

    match ctx.format {
        OutputFormat::Json => {
            let checks: Vec<_> = report
                .checks
                .iter()
                .map(|c| json!({"name": c.name, "passed": c.passed, "detail": c.detail}))
                .collect();
            print_json(&json!({
                "file": args.file.display().to_string(),
                "valid": report.valid,
                "checks": checks,
            }))?;
        }
        OutputFormat::Text => {
            println!("File: {}", args.file.display());
            print!("{}", report.to_report());
        }
    }

    Ok(if report.valid { EXIT_SUCCESS } else { EXIT_INVALID })
}
