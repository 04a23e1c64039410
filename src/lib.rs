//! Sorting Lab
//!
//! Classic sorting algorithms instrumented for teaching and benchmarking:
//!
//! - **Quick, heap, shell, merge and radix sort**, each returning the sorted
//!   array plus an optional, bounded list of intermediate snapshots for
//!   step-by-step playback.
//! - **A registry** mapping short keys (`"quick"`, `"radix"`, ...) to
//!   descriptors with a uniform calling convention.
//! - **Dataset generators** for random, partially sorted and reverse sorted
//!   integer arrays, reproducible from a seed.
//! - **A measurement harness** timing a callable while a background thread
//!   samples resident memory and the allocation tracer records the peak.
//! - **A batch runner and report** producing CSV, JSON and Markdown tables.
//!
//! ```
//! use sorting_lab::{Registry, StepOptions};
//!
//! let registry = Registry::new();
//! let out = registry.run("quick", &[3, 1, 2], StepOptions::recording(10)).unwrap();
//! assert_eq!(out.sorted, vec![1, 2, 3]);
//! assert!(!out.steps.is_empty());
//! ```

pub mod data_gen;
pub mod error;
pub mod heap_sort;
pub mod memory;
pub mod merge_sort;
pub mod metrics;
pub mod quick_sort;
pub mod radix_sort;
pub mod registry;
pub mod report;
pub mod runner;
pub mod shell_sort;
pub mod trace;

pub use data_gen::DatasetKind;
pub use error::{LabError, Result};
pub use metrics::{Harness, MeasureConfig, Measurement, TrialStats};
pub use registry::{Algorithm, Registry};
pub use report::{BenchmarkRecord, BenchmarkReport};
pub use runner::{run_experiments, ExperimentPlan};
pub use trace::{is_sorted, SortOutput, StepOptions};
