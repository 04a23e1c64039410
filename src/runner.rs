//! Batch Experiments
//!
//! Runs every (algorithm, size) pair of a plan through the measurement
//! harness and produces one [`BenchmarkRecord`] per pair.

use std::sync::atomic::AtomicBool;

use crate::data_gen::{self, DatasetKind};
use crate::error::{LabError, Result};
use crate::metrics::{Harness, DEFAULT_RUNS};
use crate::registry::Registry;
use crate::report::BenchmarkRecord;
use crate::trace::StepOptions;

/// What to benchmark.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentPlan {
    pub algorithms: Vec<String>,
    pub sizes: Vec<usize>,
    pub dataset: DatasetKind,
    pub runs: usize,
    /// Seed for dataset generation; `None` draws fresh data each run.
    pub seed: Option<u64>,
}

impl Default for ExperimentPlan {
    fn default() -> Self {
        ExperimentPlan {
            algorithms: vec!["quick".into(), "heap".into(), "merge".into()],
            sizes: vec![1000, 10_000],
            dataset: DatasetKind::Random,
            runs: DEFAULT_RUNS,
            seed: None,
        }
    }
}

impl ExperimentPlan {
    /// Check the plan against the registry before any work is done.
    pub fn validate(&self, registry: &Registry) -> Result<()> {
        if self.algorithms.is_empty() {
            return Err(LabError::invalid("no algorithms selected"));
        }
        if self.sizes.is_empty() {
            return Err(LabError::invalid("no dataset sizes selected"));
        }
        if self.runs == 0 {
            return Err(LabError::invalid("runs must be at least 1"));
        }
        for key in &self.algorithms {
            registry.get(key)?;
        }
        Ok(())
    }
}

/// Run the plan and return one record per (algorithm, size), algorithm-major.
///
/// Every algorithm for a given size sorts the same base dataset. Trials run
/// sequentially; `cancel` is checked before each trial.
pub fn run_experiments(
    registry: &Registry,
    harness: &Harness,
    plan: &ExperimentPlan,
    cancel: Option<&AtomicBool>,
) -> Result<Vec<BenchmarkRecord>> {
    plan.validate(registry)?;

    let datasets = plan
        .sizes
        .iter()
        .map(|&size| data_gen::generate_kind(plan.dataset, size, plan.seed))
        .collect::<Result<Vec<_>>>()?;

    let mut records = Vec::with_capacity(plan.algorithms.len() * plan.sizes.len());
    for key in &plan.algorithms {
        let algorithm = registry.get(key)?;
        for (&size, data) in plan.sizes.iter().zip(&datasets) {
            log::info!(
                "running {} on {} {} elements x{}",
                algorithm.name,
                plan.dataset,
                size,
                plan.runs
            );
            let stats = harness.try_run_trials(
                || algorithm.run(data, StepOptions::default()).map(|out| out.sorted),
                plan.runs,
                cancel,
            )?;
            records.push(BenchmarkRecord {
                algorithm: algorithm.key.to_string(),
                dataset: plan.dataset.to_string(),
                size,
                runs: plan.runs,
                avg_time_s: stats.avg,
                std_time_s: stats.std,
                memory_mb: stats.memory_mb,
                memory_peak_mb: stats.memory_peak_mb,
            });
        }
    }
    Ok(records)
}
