//! Step Capture
//!
//! Every algorithm in this crate can optionally record full-array snapshots
//! while it sorts. The snapshots drive step-through playback, so each one is a
//! deep copy of the working array at that instant. Recording is bounded by a
//! caller-supplied limit: once the limit is reached the sort keeps running but
//! nothing more is copied.

/// Default cap on recorded snapshots.
pub const DEFAULT_STEP_LIMIT: usize = 400;

/// Controls snapshot recording for a single sort call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOptions {
    /// Whether to record snapshots at all.
    pub record_steps: bool,
    /// Maximum number of snapshots kept.
    pub step_limit: usize,
}

impl StepOptions {
    /// Record up to `step_limit` snapshots.
    pub fn recording(step_limit: usize) -> Self {
        StepOptions {
            record_steps: true,
            step_limit,
        }
    }
}

impl Default for StepOptions {
    fn default() -> Self {
        StepOptions {
            record_steps: false,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

/// Result of a sort call: the sorted copy and the recorded snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutput<T> {
    pub sorted: Vec<T>,
    pub steps: Vec<Vec<T>>,
}

impl<T: Clone + PartialEq> SortOutput<T> {
    /// Frames for playback, with the initial and final states added when the
    /// recorded trace does not already start and end with them.
    pub fn playback_frames(&self, initial: &[T]) -> Vec<Vec<T>> {
        let mut frames = Vec::with_capacity(self.steps.len() + 2);
        if self.steps.first().map(|s| s.as_slice()) != Some(initial) {
            frames.push(initial.to_vec());
        }
        frames.extend(self.steps.iter().cloned());
        if frames.last() != Some(&self.sorted) {
            frames.push(self.sorted.clone());
        }
        frames
    }
}

/// Bounded snapshot collector shared by the algorithms.
pub(crate) struct StepRecorder<T> {
    enabled: bool,
    limit: usize,
    steps: Vec<Vec<T>>,
}

impl<T: Clone> StepRecorder<T> {
    pub(crate) fn new(options: StepOptions) -> Self {
        StepRecorder {
            enabled: options.record_steps,
            limit: options.step_limit,
            steps: Vec::new(),
        }
    }

    /// Copy the working array if recording is on and the cap is not reached.
    #[inline]
    pub(crate) fn record(&mut self, arr: &[T]) {
        if self.enabled && self.steps.len() < self.limit {
            self.steps.push(arr.to_vec());
        }
    }

    pub(crate) fn finish(self, sorted: Vec<T>) -> SortOutput<T> {
        SortOutput {
            sorted,
            steps: self.steps,
        }
    }
}

/// Check if a slice is sorted in ascending order.
#[inline]
pub fn is_sorted<T: PartialOrd>(data: &[T]) -> bool {
    data.windows(2).all(|w| w[0] <= w[1])
}
