//! Sorting Lab batch runner
//!
//! Benchmarks a set of sorting algorithms over one dataset kind at several
//! sizes, prints the result table and saves it as CSV.
//!
//! ```text
//! sorting-lab --algos quick,heap,merge --sizes 1000,10000 --dataset random --runs 3
//! ```
//!
//! The binary installs the tracking allocator, so `memory_mb` is filled in.
//! Set `RUST_LOG=info` to follow progress, `RUST_LOG=debug` for every trial.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use sorting_lab::memory::TrackingAllocator;
use sorting_lab::{
    run_experiments, BenchmarkRecord, BenchmarkReport, DatasetKind, ExperimentPlan, Harness,
    MeasureConfig, Registry,
};

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Parser)]
#[command(name = "sorting-lab")]
#[command(about = "Sorting Lab batch runner")]
struct Args {
    /// Comma-separated algorithm list
    #[arg(long, value_delimiter = ',', default_value = "quick,heap,merge")]
    algos: Vec<String>,

    /// Comma-separated dataset sizes
    #[arg(long, value_delimiter = ',', default_value = "1000,10000")]
    sizes: Vec<usize>,

    /// Dataset type: random, partial or reverse
    #[arg(long, default_value = "random", value_parser = parse_dataset)]
    dataset: DatasetKind,

    /// Repeat count per scenario
    #[arg(long, default_value_t = 3)]
    runs: usize,

    /// Seed for dataset generation (fresh data when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// CSV output path (empty to skip)
    #[arg(long, default_value = "data/results/experiments.csv")]
    save: String,

    /// How to print the results
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

fn parse_dataset(s: &str) -> Result<DatasetKind, String> {
    s.parse().map_err(|e: sorting_lab::LabError| e.to_string())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let plan = ExperimentPlan {
        algorithms: args
            .algos
            .iter()
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .collect(),
        sizes: args.sizes,
        dataset: args.dataset,
        runs: args.runs,
        seed: args.seed,
    };

    let registry = Registry::new();
    let harness = Harness::new(MeasureConfig::default());
    log::info!("{:?}", harness);

    let records = run_experiments(&registry, &harness, &plan, None)?;

    match args.format {
        OutputFormat::Table => print!("{}", format_table(&records)),
        OutputFormat::Csv => {
            let mut report = BenchmarkReport::new("sorting-lab batch run");
            report.records = records.clone();
            print!("{}", report.to_csv());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
    }

    if !args.save.is_empty() {
        let path = PathBuf::from(&args.save);
        let mut report = BenchmarkReport::new(&format!(
            "{} dataset, {} runs per configuration",
            plan.dataset, plan.runs
        ));
        report.records = records;
        report.save_csv(&path)?;
        eprintln!("Results saved to {}", path.display());
    }

    Ok(())
}

/// Right-aligned plain-text table, one row per record.
fn format_table(records: &[BenchmarkRecord]) -> String {
    let header = [
        "algorithm",
        "dataset",
        "size",
        "runs",
        "avg_time_s",
        "std_time_s",
        "memory_mb",
        "memory_peak_mb",
    ];
    let optional = |v: Option<f64>| v.map(|m| format!("{:.6}", m)).unwrap_or_else(|| "NaN".into());

    let rows: Vec<[String; 8]> = records
        .iter()
        .map(|r| {
            [
                r.algorithm.clone(),
                r.dataset.clone(),
                r.size.to_string(),
                r.runs.to_string(),
                format!("{:.6}", r.avg_time_s),
                format!("{:.6}", r.std_time_s),
                optional(r.memory_mb),
                optional(r.memory_peak_mb),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: Vec<&str>| {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:>w$}", cell, w = w))
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    };
    push_row(header.to_vec());
    for row in &rows {
        push_row(row.iter().map(String::as_str).collect());
    }
    out
}
