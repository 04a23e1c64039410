//! Measurement tests with the tracking allocator installed.
//!
//! The allocation counters are process-wide, so every test here takes
//! `SERIAL` to keep measurements from overlapping.

use std::sync::{Mutex, MutexGuard};

use sorting_lab::memory::{AllocationTracer, TrackingAllocator};
use sorting_lab::metrics::{self, Harness, MeasureConfig};
use sorting_lab::{LabError, Registry, StepOptions};

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn quiet_harness() -> Harness {
    Harness::with_probe(MeasureConfig::default(), None)
}

#[test]
fn test_allocator_is_installed() {
    let _guard = serial();
    let v = vec![0u8; 16];
    drop(v);
    assert!(AllocationTracer::is_installed());
}

#[test]
fn test_measure_reports_allocation_peak() {
    let _guard = serial();
    let m = quiet_harness().measure(|| {
        let buf = vec![1u8; 8 * 1024 * 1024];
        buf.iter().map(|&b| b as u64).sum::<u64>()
    });

    assert_eq!(m.output, 8 * 1024 * 1024);
    let mb = m.memory_mb.unwrap();
    assert!(mb >= 7.9, "peak allocation {} MiB", mb);
    assert_eq!(m.memory_peak_mb, None);
}

#[test]
fn test_measure_sum_with_memory() {
    let _guard = serial();
    let m = metrics::measure(|| (0..1000u64).sum::<u64>());
    assert_eq!(m.output, 499_500);
    assert!(m.duration_secs() >= 0.0);
    assert!(m.memory_mb.unwrap() >= 0.0);
    if let Some(peak) = m.memory_peak_mb {
        assert!(peak > 0.0);
    }
}

#[test]
fn test_tracer_stopped_after_measure() {
    let _guard = serial();
    assert!(!AllocationTracer::is_tracing());
    let _ = quiet_harness().measure(|| vec![0u32; 1024]);
    assert!(!AllocationTracer::is_tracing());
}

#[test]
fn test_tracer_left_running_when_already_tracing() {
    let _guard = serial();
    AllocationTracer::start();
    let m = quiet_harness().measure(|| vec![0u64; 4096]);
    assert!(m.memory_mb.is_some());
    assert!(AllocationTracer::is_tracing());
    AllocationTracer::stop();
}

#[test]
fn test_tracer_restored_after_error() {
    let _guard = serial();
    let result = quiet_harness().try_measure(|| -> Result<(), LabError> {
        let _scratch = vec![0u8; 4096];
        Err(LabError::UnknownAlgorithm("bogo".into()))
    });
    assert!(matches!(result, Err(LabError::UnknownAlgorithm(_))));
    assert!(!AllocationTracer::is_tracing());
}

#[test]
fn test_tracer_restored_after_panic() {
    let _guard = serial();
    let result = std::panic::catch_unwind(|| {
        quiet_harness().measure(|| -> u32 { panic!("callable failed") })
    });
    assert!(result.is_err());
    assert!(!AllocationTracer::is_tracing());
}

#[test]
fn test_trials_aggregate_memory() {
    let _guard = serial();
    let registry = Registry::new();
    let data: Vec<i64> = (0..5000).rev().collect();
    let stats = quiet_harness().run_trials(
        || registry.run("merge", &data, StepOptions::default()),
        2,
    );
    assert_eq!(stats.durations.len(), 2);
    assert!(stats.avg >= 0.0);
    assert!(stats.std >= 0.0);
    assert!(stats.memory_mb.unwrap() > 0.0);
    assert_eq!(stats.memory_peak_mb, None);
}
