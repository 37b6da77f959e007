//! Iterations command implementation

use super::{print_json, truncate, Context, EXIT_SUCCESS};
use crate::config::cli::IterationsArgs;
use crate::config::OutputFormat;
use crate::recording::IterationRecord;

pub fn run_iterations(ctx: &Context, args: &IterationsArgs) -> Result<u8, String> {
    let recording = ctx.open(&args.file)?;
    let records = recording
        .get_driver_iterations(args.first)
        .map_err(|e| format!("Failed to read iterations: {e}"))?;

    match ctx.format {
        OutputFormat::Json => print_json(&records)?,
        OutputFormat::Text => print_table(&records),
    }
    Ok(EXIT_SUCCESS)
}

fn print_table(records: &[IterationRecord]) {
    if records.is_empty() {
        eprintln!("No iterations recorded");
        return;
    }

    println!(
        "{:<8} {:<32} {:<20} {:<4} {:>4} {:>4} {:>4} {:>4} {:>4}",
        "COUNTER", "COORDINATE", "RECORDED", "OK", "DV", "OBJ", "CON", "SYS", "IN"
    );
    println!("{}", "-".repeat(94));
    for record in records {
        let recorded = record
            .recorded_at()
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:<32} {:<20} {:<4} {:>4} {:>4} {:>4} {:>4} {:>4}",
            record.counter,
            truncate(&record.iteration_coordinate, 30),
            recorded,
            if record.is_success() { "yes" } else { "no" },
            record.desvars.len(),
            record.objectives.len(),
            record.constraints.len(),
            record.sysincludes.len(),
            record.inputs.len(),
        );
        if !record.msg.is_empty() {
            println!("         msg: {}", record.msg);
        }
    }
    println!("\n{} iteration(s)", records.len());
}
