//! Results to Markdown Converter
//!
//! Converts a CSV export of `sorting-lab` into a Markdown report.
//!
//! Usage:
//!   results2md input.csv [output.md]
//!
//! If output is not specified, prints to stdout.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use sorting_lab::report::parse_csv_report;

#[derive(Parser)]
#[command(name = "results2md")]
#[command(about = "Converts a sorting-lab results CSV to Markdown format")]
struct Args {
    /// Path to the CSV written by sorting-lab --save
    input: PathBuf,

    /// Output path (prints to stdout if not specified)
    output: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let content = match fs::read_to_string(&args.input) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading {}: {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let mut report = match parse_csv_report(&content) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: could not parse {}: {}", args.input.display(), e);
            process::exit(1);
        }
    };
    report.description = format!("Converted from {}", args.input.display());
    log::info!("parsed {} records", report.records.len());

    match args.output {
        Some(output_path) => {
            if let Err(e) = report.save_markdown(&output_path) {
                eprintln!("Error writing output file: {}", e);
                process::exit(1);
            }
            println!("Markdown report written to: {}", output_path.display());
        }
        None => print!("{}", report.to_markdown_table()),
    }
}
