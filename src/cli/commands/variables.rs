//! Variables command implementation

use super::{print_json, Context, EXIT_SUCCESS};
use crate::config::cli::FileArgs;
use crate::config::OutputFormat;
use serde_json::{json, Value as Json};

pub fn run_variables(ctx: &Context, args: &FileArgs) -> Result<u8, String> {
    let recording = ctx.open(&args.file)?;
    let names = recording
        .get_metadata()
        .map_err(|e| format!("Failed to read name maps: {e}"))?
        .unwrap_or_default();
    let first = recording
        .get_driver_iterations(true)
        .map_err(|e| format!("Failed to read iterations: {e}"))?;

    let grouped: Vec<(&str, &str)> = first
        .first()
        .map(|record| record.variables().map(|(group, v)| (group, v.name.as_str())).collect())
        .unwrap_or_default();

    match ctx.format {
        OutputFormat::Json => {
            let variables: Vec<Json> =
                grouped.iter().map(|(group, name)| json!({"group": group, "name": name})).collect();
            print_json(&json!({
                "abs2prom": names.abs2prom,
                "prom2abs": names.prom2abs,
                "variables": variables,
            }))?;
        }
        OutputFormat::Text => {
            if grouped.is_empty() {
                eprintln!("No iterations recorded");
            } else {
                println!("{:<14} {:<40} {:<30}", "GROUP", "NAME", "PROMOTED");
                println!("{}", "-".repeat(84));
                for (group, name) in &grouped {
                    let promoted = names.abs2prom.get(*name).and_then(Json::as_str).unwrap_or("");
                    println!("{group:<14} {name:<40} {promoted:<30}");
                }
            }
            let mapped = names.abs2prom.as_object().map_or(0, |m| m.len());
            println!("\n{} variable(s), {mapped} promoted name(s)", grouped.len());
        }
    }
    Ok(EXIT_SUCCESS)
}
