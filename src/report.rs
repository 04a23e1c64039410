//! Benchmark Report
//!
//! Holds the batch benchmark table and renders it in two formats:
//!
//! - **CSV** with the columns
//!   `algorithm,dataset,size,runs,avg_time_s,std_time_s,memory_mb,memory_peak_mb`.
//!   Unmeasured memory fields are written as empty cells. Files without the
//!   `memory_peak_mb` column (older exports) still parse.
//! - **Markdown**, with the raw table, a per-algorithm summary and the
//!   fastest algorithm for every dataset size.

use std::fmt::Write;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{LabError, Result};
use crate::metrics::mean;

/// CSV header, in column order.
pub const CSV_COLUMNS: [&str; 8] = [
    "algorithm",
    "dataset",
    "size",
    "runs",
    "avg_time_s",
    "std_time_s",
    "memory_mb",
    "memory_peak_mb",
];

/// Aggregated result for one (algorithm, dataset, size) configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRecord {
    /// Registry key of the algorithm (e.g. "quick")
    pub algorithm: String,
    /// Dataset kind (e.g. "random")
    pub dataset: String,
    /// Array size in elements
    pub size: usize,
    /// Number of trials
    pub runs: usize,
    /// Mean duration in seconds
    pub avg_time_s: f64,
    /// Sample standard deviation of the duration in seconds
    pub std_time_s: f64,
    /// Mean allocation peak in MiB, if measured
    pub memory_mb: Option<f64>,
    /// Mean peak resident set size in MiB, if measured
    pub memory_peak_mb: Option<f64>,
}

/// Per-algorithm means across all sizes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmSummary {
    pub algorithm: String,
    pub avg_time_s: f64,
    pub memory_mb: Option<f64>,
    pub memory_peak_mb: Option<f64>,
}

/// System information for the report header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    /// Logical CPUs visible to the process
    pub cpus: Option<usize>,
}

impl Default for SystemInfo {
    fn default() -> Self {
        SystemInfo {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cpus: std::thread::available_parallelism().ok().map(|n| n.get()),
        }
    }
}

/// A complete benchmark report.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    /// When the report was created (ISO 8601, UTC)
    pub timestamp: String,
    pub description: String,
    pub system_info: SystemInfo,
    pub records: Vec<BenchmarkRecord>,
}

impl BenchmarkReport {
    /// Create an empty report stamped with the current time.
    pub fn new(description: &str) -> Self {
        BenchmarkReport {
            timestamp: utc_timestamp(),
            description: description.to_string(),
            system_info: SystemInfo::default(),
            records: Vec::new(),
        }
    }

    pub fn add_record(&mut self, record: BenchmarkRecord) {
        self.records.push(record);
    }

    /// Render the records as CSV, header first.
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str(&CSV_COLUMNS.join(","));
        output.push('\n');
        for r in &self.records {
            let _ = writeln!(
                output,
                "{},{},{},{},{},{},{},{}",
                escape_csv_field(&r.algorithm),
                escape_csv_field(&r.dataset),
                r.size,
                r.runs,
                r.avg_time_s,
                r.std_time_s,
                optional_cell(r.memory_mb),
                optional_cell(r.memory_peak_mb),
            );
        }
        output
    }

    /// Write the CSV rendering to `path`, creating parent directories.
    pub fn save_csv(&self, path: &Path) -> Result<()> {
        write_creating_dirs(path, &self.to_csv())
    }

    /// Per-algorithm means, in order of first appearance.
    pub fn summary(&self) -> Vec<AlgorithmSummary> {
        let mut algorithms: Vec<&str> = Vec::new();
        for r in &self.records {
            if !algorithms.contains(&r.algorithm.as_str()) {
                algorithms.push(&r.algorithm);
            }
        }

        algorithms
            .into_iter()
            .map(|algorithm| {
                let rows: Vec<&BenchmarkRecord> =
                    self.records.iter().filter(|r| r.algorithm == algorithm).collect();
                let times: Vec<f64> = rows.iter().map(|r| r.avg_time_s).collect();
                let memory: Vec<f64> = rows.iter().filter_map(|r| r.memory_mb).collect();
                let peaks: Vec<f64> = rows.iter().filter_map(|r| r.memory_peak_mb).collect();
                AlgorithmSummary {
                    algorithm: algorithm.to_string(),
                    avg_time_s: mean(&times).unwrap_or(0.0),
                    memory_mb: mean(&memory),
                    memory_peak_mb: mean(&peaks),
                }
            })
            .collect()
    }

    /// Generate a markdown document from the report
    pub fn to_markdown_table(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "# Sorting Lab Benchmark Report");
        let _ = writeln!(output);
        let _ = writeln!(output, "**Timestamp:** {}", self.timestamp);
        let _ = writeln!(output, "**Description:** {}", self.description);
        let _ = writeln!(output);

        let _ = writeln!(output, "## System Information");
        let _ = writeln!(output);
        let _ = writeln!(output, "| Property | Value |");
        let _ = writeln!(output, "|----------|-------|");
        let _ = writeln!(output, "| OS | {} |", self.system_info.os);
        let _ = writeln!(output, "| Arch | {} |", self.system_info.arch);
        if let Some(cpus) = self.system_info.cpus {
            let _ = writeln!(output, "| CPUs | {} |", cpus);
        }
        let _ = writeln!(output);

        let _ = writeln!(output, "## Results");
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "| Algorithm | Dataset | Size | Runs | Avg (ms) | Std (ms) | Alloc peak (MB) | RSS peak (MB) |"
        );
        let _ = writeln!(
            output,
            "|-----------|---------|------|------|----------|----------|-----------------|---------------|"
        );
        for r in &self.records {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {:.3} | {:.3} | {} | {} |",
                r.algorithm,
                r.dataset,
                format_size(r.size),
                r.runs,
                r.avg_time_s * 1000.0,
                r.std_time_s * 1000.0,
                format_mb(r.memory_mb),
                format_mb(r.memory_peak_mb),
            );
        }
        let _ = writeln!(output);

        let _ = writeln!(output, "## Summary by Algorithm");
        let _ = writeln!(output);
        let _ = writeln!(output, "| Algorithm | Mean avg (ms) | Alloc peak (MB) | RSS peak (MB) |");
        let _ = writeln!(output, "|-----------|---------------|-----------------|---------------|");
        for s in self.summary() {
            let _ = writeln!(
                output,
                "| {} | {:.3} | {} | {} |",
                s.algorithm,
                s.avg_time_s * 1000.0,
                format_mb(s.memory_mb),
                format_mb(s.memory_peak_mb),
            );
        }
        let _ = writeln!(output);

        let _ = writeln!(output, "## Fastest per Size");
        let _ = writeln!(output);
        let _ = writeln!(output, "| Dataset | Size | Fastest | Slowest | Speedup |");
        let _ = writeln!(output, "|---------|------|---------|---------|---------|");

        let mut groups: Vec<(&str, usize)> = self
            .records
            .iter()
            .map(|r| (r.dataset.as_str(), r.size))
            .collect();
        groups.sort();
        groups.dedup();

        for (dataset, size) in groups {
            let rows: Vec<&BenchmarkRecord> = self
                .records
                .iter()
                .filter(|r| r.dataset == dataset && r.size == size)
                .collect();
            let fastest = rows.iter().min_by(|a, b| a.avg_time_s.total_cmp(&b.avg_time_s));
            let slowest = rows.iter().max_by(|a, b| a.avg_time_s.total_cmp(&b.avg_time_s));
            if let (Some(fast), Some(slow)) = (fastest, slowest) {
                let speedup = if fast.avg_time_s > 0.0 {
                    format!("{:.2}x", slow.avg_time_s / fast.avg_time_s)
                } else {
                    "N/A".to_string()
                };
                let _ = writeln!(
                    output,
                    "| {} | {} | {} | {} | {} |",
                    dataset,
                    format_size(size),
                    fast.algorithm,
                    slow.algorithm,
                    speedup
                );
            }
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "---");
        let _ = writeln!(output, "*Report generated by sorting-lab*");

        output
    }

    /// Save the report as a markdown file
    pub fn save_markdown(&self, path: &Path) -> Result<()> {
        write_creating_dirs(path, &self.to_markdown_table())
    }
}

fn write_creating_dirs(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    Ok(())
}

/// Parse a CSV export back into a report.
///
/// Columns are matched by header name; `memory_peak_mb` may be absent.
pub fn parse_csv_report(content: &str) -> Result<BenchmarkReport> {
    let mut report = BenchmarkReport::new("Parsed report");
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = lines.next().ok_or(LabError::Parse {
        line: 1,
        message: "empty results file".to_string(),
    })?;
    let header: Vec<&str> = header.split(',').map(str::trim).collect();
    let column = |name: &str| header.iter().position(|h| *h == name);

    let mut index = [None; CSV_COLUMNS.len()];
    for (slot, name) in index.iter_mut().zip(CSV_COLUMNS) {
        *slot = column(name);
        if slot.is_none() && name != "memory_peak_mb" {
            return Err(LabError::Parse {
                line: 1,
                message: format!("missing column '{}'", name),
            });
        }
    }

    for (line_no, line) in lines {
        let fields = split_csv_line(line);
        let row: Vec<&str> = index
            .iter()
            .map(|col| col.and_then(|c| fields.get(c)).map(|s| s.trim()).unwrap_or(""))
            .collect();
        let err = |i: usize| LabError::Parse {
            line: line_no,
            message: format!("invalid {} '{}'", CSV_COLUMNS[i], row[i]),
        };

        let parse_usize = |i: usize| row[i].parse::<usize>().map_err(|_| err(i));
        let parse_f64 = |i: usize| row[i].parse::<f64>().map_err(|_| err(i));
        let parse_opt = |i: usize| match row[i] {
            "" | "NaN" | "nan" => Ok(None),
            v => v.parse::<f64>().map(Some).map_err(|_| err(i)),
        };

        report.records.push(BenchmarkRecord {
            algorithm: row[0].to_string(),
            dataset: row[1].to_string(),
            size: parse_usize(2)?,
            runs: parse_usize(3)?,
            avg_time_s: parse_f64(4)?,
            std_time_s: parse_f64(5)?,
            memory_mb: parse_opt(6)?,
            memory_peak_mb: parse_opt(7)?,
        });
    }

    Ok(report)
}

/// Split one CSV line, honouring double-quoted fields.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Quote a CSV field if it contains a separator, quote or newline.
fn escape_csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn format_mb(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.3}", v))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Format a size as a human-readable string (e.g., "1K", "1M")
fn format_size(size: usize) -> String {
    if size >= 1_000_000 && size % 1_000_000 == 0 {
        format!("{}M", size / 1_000_000)
    } else if size >= 1_000 && size % 1_000 == 0 {
        format!("{}K", size / 1_000)
    } else {
        size.to_string()
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SSZ`, computed from the Unix clock.
fn utc_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    let time_of_day = secs % 86_400;

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        time_of_day / 3600,
        (time_of_day % 3600) / 60,
        time_of_day % 60
    )
}

/// Convert days since 1970-01-01 into a (year, month, day) civil date.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(algorithm: &str, size: usize, avg: f64, memory: Option<f64>) -> BenchmarkRecord {
        BenchmarkRecord {
            algorithm: algorithm.to_string(),
            dataset: "random".to_string(),
            size,
            runs: 3,
            avg_time_s: avg,
            std_time_s: 0.001,
            memory_mb: memory,
            memory_peak_mb: memory.map(|m| m + 40.0),
        }
    }

    fn sample_report() -> BenchmarkReport {
        let mut report = BenchmarkReport::new("Test benchmark");
        report.add_record(record("quick", 1000, 0.002, Some(0.5)));
        report.add_record(record("quick", 10_000, 0.02, None));
        report.add_record(record("merge", 1000, 0.004, Some(1.5)));
        report
    }

    #[test]
    fn test_csv_header_and_empty_cells() {
        let csv = sample_report().to_csv();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "algorithm,dataset,size,runs,avg_time_s,std_time_s,memory_mb,memory_peak_mb"
        );
        assert_eq!(lines.next().unwrap(), "quick,random,1000,3,0.002,0.001,0.5,40.5");
        assert_eq!(lines.next().unwrap(), "quick,random,10000,3,0.02,0.001,,");
    }

    #[test]
    fn test_parse_csv_preserves_missing_memory() {
        let report = sample_report();
        let parsed = parse_csv_report(&report.to_csv()).unwrap();
        assert_eq!(parsed.records, report.records);
    }

    #[test]
    fn test_parse_csv_without_peak_column() {
        let csv = "algorithm,dataset,size,runs,avg_time_s,std_time_s,memory_mb\n\
                   heap,reverse,500,2,0.01,0.0,0.25\n";
        let parsed = parse_csv_report(csv).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].algorithm, "heap");
        assert_eq!(parsed.records[0].memory_mb, Some(0.25));
        assert_eq!(parsed.records[0].memory_peak_mb, None);
    }

    #[test]
    fn test_parse_csv_errors() {
        assert!(matches!(parse_csv_report(""), Err(LabError::Parse { line: 1, .. })));
        assert!(matches!(
            parse_csv_report("algorithm,size\nquick,10\n"),
            Err(LabError::Parse { line: 1, .. })
        ));
        let bad = format!("{}\nquick,random,ten,3,0.1,0.0,,\n", CSV_COLUMNS.join(","));
        assert!(matches!(parse_csv_report(&bad), Err(LabError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_summary_means() {
        let summary = sample_report().summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].algorithm, "quick");
        assert!((summary[0].avg_time_s - 0.011).abs() < 1e-12);
        assert_eq!(summary[0].memory_mb, Some(0.5));
        assert_eq!(summary[1].algorithm, "merge");
        assert_eq!(summary[1].memory_peak_mb, Some(41.5));
    }

    #[test]
    fn test_markdown_contents() {
        let md = sample_report().to_markdown_table();
        assert!(md.contains("# Sorting Lab Benchmark Report"));
        assert!(md.contains("| quick | random | 1K | 3 | 2.000 | 1.000 | 0.500 | 40.500 |"));
        assert!(md.contains("| quick | random | 10K | 3 | 20.000 | 1.000 | N/A | N/A |"));
        assert!(md.contains("| random | 1K | quick | merge | 2.00x |"));
    }

    #[test]
    fn test_split_csv_line_quotes() {
        assert_eq!(split_csv_line("a,\"b,c\",d"), vec!["a", "b,c", "d"]);
        assert_eq!(split_csv_line("\"x\"\"y\",,"), vec!["x\"y", "", ""]);
        assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_field("plain"), "plain");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500");
        assert_eq!(format_size(1000), "1K");
        assert_eq!(format_size(1024), "1024");
        assert_eq!(format_size(1_000_000), "1M");
        assert_eq!(format_size(250_000), "250K");
    }

    #[test]
    fn test_civil_from_days() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(11_016), (2000, 2, 29));
        assert_eq!(civil_from_days(19_723), (2024, 1, 1));
    }

    #[test]
    fn test_save_csv_creates_directories() {
        let dir = std::env::temp_dir().join(format!("sorting-lab-report-{}", std::process::id()));
        let path = dir.join("nested").join("experiments.csv");
        sample_report().save_csv(&path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(parse_csv_report(&written).unwrap().records.len(), 3);
        let _ = fs::remove_dir_all(&dir);
    }
}
