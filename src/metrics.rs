//! Timing and Memory Measurement
//!
//! [`measure`] runs a callable on the calling thread and reports:
//!
//! - wall-clock duration of the call,
//! - `memory_mb`: peak allocated bytes above the starting level, when the
//!   [`TrackingAllocator`](crate::memory::TrackingAllocator) is installed,
//! - `memory_peak_mb`: highest resident set size observed during the call,
//!   sampled every 10 ms by one background thread, when an RSS probe exists.
//!
//! Memory fields are `None` when their instrumentation is unavailable; `None`
//! means "not measured", never zero.
//!
//! With an RSS probe, starting a measurement waits about one sample interval
//! for the sampler thread to settle. That wait is outside the timed region,
//! and it keeps the harness's own allocations out of `memory_mb`.
//!
//! The allocation counters are process-wide, so at most one measurement
//! should be in flight at a time. Overlapping calls are detected and logged
//! but not serialized.

use std::convert::Infallible;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use serde::Serialize;

use crate::error::{LabError, Result};
use crate::memory::{rss_probe, AllocationTracer, RssProbe, BYTES_PER_MB};

/// Polling interval of the RSS sampler thread.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(10);
/// Longest wait for the sampler thread to acknowledge a stop request.
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(1);
/// Default number of trials per configuration.
pub const DEFAULT_RUNS: usize = 3;

/// Tunables for the measurement harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasureConfig {
    pub sample_interval: Duration,
    pub join_timeout: Duration,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        MeasureConfig {
            sample_interval: SAMPLE_INTERVAL,
            join_timeout: JOIN_TIMEOUT,
        }
    }
}

/// Readings for one execution of a callable.
#[derive(Debug, Clone)]
pub struct Measurement<T> {
    pub duration: Duration,
    /// Peak allocation above the starting level, in MiB.
    pub memory_mb: Option<f64>,
    /// Peak resident set size of the process, in MiB.
    pub memory_peak_mb: Option<f64>,
    pub output: T,
}

impl<T> Measurement<T> {
    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// Aggregate of repeated measurements of the same callable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialStats {
    /// Duration of each trial in seconds
    pub durations: Vec<f64>,
    /// Mean duration in seconds
    pub avg: f64,
    /// Sample standard deviation of the durations (0 for fewer than two trials)
    pub std: f64,
    /// Mean of the available `memory_mb` readings
    pub memory_mb: Option<f64>,
    /// Mean of the available `memory_peak_mb` readings
    pub memory_peak_mb: Option<f64>,
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample (n - 1) standard deviation, 0 for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

#[derive(Default)]
struct TrialAccumulator {
    durations: Vec<f64>,
    memory: Vec<f64>,
    memory_peak: Vec<f64>,
}

impl TrialAccumulator {
    fn push<T>(&mut self, m: &Measurement<T>) {
        self.durations.push(m.duration_secs());
        self.memory.extend(m.memory_mb);
        self.memory_peak.extend(m.memory_peak_mb);
    }

    fn finish(self) -> TrialStats {
        TrialStats {
            avg: mean(&self.durations).unwrap_or(0.0),
            std: sample_std_dev(&self.durations),
            memory_mb: mean(&self.memory),
            memory_peak_mb: mean(&self.memory_peak),
            durations: self.durations,
        }
    }
}

static IN_FLIGHT: AtomicUsize = AtomicUsize::new(0);

/// Counts concurrent measurements for the duration of one call.
struct InFlightGuard;

impl InFlightGuard {
    fn enter() -> Self {
        if IN_FLIGHT.fetch_add(1, Ordering::AcqRel) > 0 {
            log::warn!("overlapping measurements share the allocation counters; memory readings may be mixed");
        }
        InFlightGuard
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        IN_FLIGHT.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Allocation-tracer window for one measurement.
///
/// Restores the tracer to its previous state when finished or dropped, so a
/// panicking callable does not leave tracing switched on.
struct TracerSession {
    baseline: usize,
    started: bool,
    closed: bool,
}

impl TracerSession {
    fn begin() -> Option<Self> {
        if !AllocationTracer::is_installed() {
            return None;
        }
        let started = !AllocationTracer::is_tracing();
        if started {
            AllocationTracer::start();
        } else {
            AllocationTracer::reset_peak();
        }
        let (baseline, _) = AllocationTracer::traced_memory();
        Some(TracerSession {
            baseline,
            started,
            closed: false,
        })
    }

    /// Peak allocation above the baseline, in MiB.
    fn finish(mut self) -> f64 {
        let (_, peak) = AllocationTracer::traced_memory();
        self.close();
        peak.saturating_sub(self.baseline) as f64 / BYTES_PER_MB
    }

    fn close(&mut self) {
        if self.started && !self.closed {
            AllocationTracer::stop();
        }
        self.closed = true;
    }
}

impl Drop for TracerSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Background thread folding RSS readings into a shared peak.
///
/// Stopping drops the stop sender, which wakes the sampler immediately; the
/// sampler acknowledges on `done` before exiting. Dropping the sampler stops
/// it, so the thread is released on every exit path of a measurement.
///
/// `spawn` returns only after the thread has completed one timed wait and one
/// reading. The first blocking wait sets up per-thread channel state, which
/// allocates; after that the sampling loop allocates nothing.
struct RssSampler {
    probe: Arc<dyn RssProbe>,
    peak: Arc<AtomicU64>,
    stop_tx: Option<Sender<()>>,
    done_rx: Receiver<()>,
    /// Held until the sampler is dropped so the channel is freed afterwards.
    _ready_rx: Receiver<()>,
    handle: Option<JoinHandle<()>>,
    join_timeout: Duration,
}

impl RssSampler {
    fn spawn(probe: Arc<dyn RssProbe>, config: MeasureConfig) -> Self {
        let peak = Arc::new(AtomicU64::new(probe.resident_bytes().unwrap_or(0)));
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let (done_tx, done_rx) = bounded::<()>(1);
        let (ready_tx, ready_rx) = bounded::<()>(1);

        let worker_probe = Arc::clone(&probe);
        let worker_peak = Arc::clone(&peak);
        let interval = config.sample_interval;
        let handle = thread::Builder::new()
            .name("rss-sampler".to_string())
            .spawn(move || {
                let mut ready_tx = Some(ready_tx);
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => match worker_probe.resident_bytes() {
                            Some(rss) => {
                                worker_peak.fetch_max(rss, Ordering::Relaxed);
                            }
                            None => break,
                        },
                        _ => break,
                    }
                    if let Some(tx) = ready_tx.take() {
                        let _ = tx.send(());
                    }
                }
                drop(ready_tx);
                let _ = done_tx.send(());
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("could not start RSS sampler thread: {}", e);
                None
            }
        };

        if handle.is_some() {
            if let Err(RecvTimeoutError::Timeout) = ready_rx.recv_timeout(config.join_timeout) {
                log::warn!(
                    "RSS sampler not ready within {:?}; its setup may count as allocation",
                    config.join_timeout
                );
            }
        }

        RssSampler {
            probe,
            peak,
            stop_tx: Some(stop_tx),
            done_rx,
            _ready_rx: ready_rx,
            handle,
            join_timeout: config.join_timeout,
        }
    }

    fn stop(&mut self) {
        drop(self.stop_tx.take());
        let Some(handle) = self.handle.take() else {
            return;
        };
        match self.done_rx.recv_timeout(self.join_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if handle.join().is_err() {
                    log::warn!("RSS sampler thread panicked");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "RSS sampler did not stop within {:?}; detaching it",
                    self.join_timeout
                );
            }
        }
    }

    /// Stop sampling and return the peak in bytes, including one final reading.
    fn finish(mut self) -> Option<u64> {
        self.stop();
        if let Some(rss) = self.probe.resident_bytes() {
            self.peak.fetch_max(rss, Ordering::Relaxed);
        }
        match self.peak.load(Ordering::Relaxed) {
            0 => None,
            bytes => Some(bytes),
        }
    }
}

impl Drop for RssSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Measurement harness with a fixed configuration and RSS probe.
#[derive(Clone)]
pub struct Harness {
    config: MeasureConfig,
    probe: Option<Arc<dyn RssProbe>>,
}

impl fmt::Debug for Harness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("config", &self.config)
            .field("rss_probe", &self.probe.is_some())
            .finish()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Harness::new(MeasureConfig::default())
    }
}

impl Harness {
    /// Harness using the platform RSS probe, if there is one.
    pub fn new(config: MeasureConfig) -> Self {
        Harness {
            config,
            probe: rss_probe(),
        }
    }

    /// Harness with an explicit RSS probe (`None` disables RSS sampling).
    pub fn with_probe(config: MeasureConfig, probe: Option<Arc<dyn RssProbe>>) -> Self {
        Harness { config, probe }
    }

    /// Measure one call of `f`.
    pub fn measure<T, F>(&self, f: F) -> Measurement<T>
    where
        F: FnOnce() -> T,
    {
        match self.try_measure(|| Ok::<T, Infallible>(f())) {
            Ok(m) => m,
            Err(never) => match never {},
        }
    }

    /// Measure one call of a fallible `f`.
    ///
    /// An error from `f` is returned unchanged once the sampler thread has
    /// been stopped and the allocation tracer restored. A panic in `f`
    /// unwinds through the same cleanup.
    pub fn try_measure<T, E, F>(&self, f: F) -> std::result::Result<Measurement<T>, E>
    where
        F: FnOnce() -> std::result::Result<T, E>,
    {
        let _in_flight = InFlightGuard::enter();
        let sampler = self
            .probe
            .as_ref()
            .map(|probe| RssSampler::spawn(Arc::clone(probe), self.config));
        let tracer = TracerSession::begin();

        let start = Instant::now();
        let result = f();
        let duration = start.elapsed();

        // Allocation peak first: stopping the sampler touches the channels.
        let memory_mb = tracer.map(TracerSession::finish);
        let peak_rss = sampler.and_then(RssSampler::finish);
        let output = result?;

        Ok(Measurement {
            duration,
            memory_mb,
            memory_peak_mb: peak_rss.map(|bytes| bytes as f64 / BYTES_PER_MB),
            output,
        })
    }

    /// Measure `f` `runs` times, one trial after another, and aggregate.
    pub fn run_trials<T, F>(&self, mut f: F, runs: usize) -> TrialStats
    where
        F: FnMut() -> T,
    {
        let mut acc = TrialAccumulator::default();
        for trial in 0..runs {
            let m = self.measure(&mut f);
            log::debug!("trial {}/{}: {:.6}s", trial + 1, runs, m.duration_secs());
            acc.push(&m);
        }
        acc.finish()
    }

    /// Like [`Harness::run_trials`] for a fallible `f`, with optional
    /// cancellation checked before each trial.
    ///
    /// The first error from `f` aborts the remaining trials. A raised
    /// `cancel` flag yields [`LabError::Cancelled`].
    pub fn try_run_trials<T, F>(
        &self,
        mut f: F,
        runs: usize,
        cancel: Option<&AtomicBool>,
    ) -> Result<TrialStats>
    where
        F: FnMut() -> Result<T>,
    {
        let mut acc = TrialAccumulator::default();
        for trial in 0..runs {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(LabError::Cancelled { completed: trial });
            }
            let m = self.try_measure(&mut f)?;
            log::debug!("trial {}/{}: {:.6}s", trial + 1, runs, m.duration_secs());
            acc.push(&m);
        }
        Ok(acc.finish())
    }
}

/// Measure one call of `f` with the default harness.
pub fn measure<T, F>(f: F) -> Measurement<T>
where
    F: FnOnce() -> T,
{
    Harness::default().measure(f)
}

/// Measure one call of a fallible `f` with the default harness.
pub fn try_measure<T, E, F>(f: F) -> std::result::Result<Measurement<T>, E>
where
    F: FnOnce() -> std::result::Result<T, E>,
{
    Harness::default().try_measure(f)
}

/// Measure `f` `runs` times with the default harness and aggregate.
pub fn run_trials<T, F>(f: F, runs: usize) -> TrialStats
where
    F: FnMut() -> T,
{
    Harness::default().run_trials(f, runs)
}
