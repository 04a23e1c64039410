//! Merge Sort
//!
//! Classic top-down merge sort. Each merge copies both runs out of the
//! working array and writes them back in order, taking from the left run on
//! ties, which keeps equal elements in input order.
//!
//! Complexity: O(n log n) in all cases, O(n) auxiliary memory. Stable.

use crate::trace::{SortOutput, StepOptions, StepRecorder};

/// Sort a copy of `items`, optionally recording snapshots.
///
/// A snapshot is taken after every element written during a merge.
pub fn sort<T: Ord + Clone>(items: &[T], options: StepOptions) -> SortOutput<T> {
    let mut arr = items.to_vec();
    let mut recorder = StepRecorder::new(options);

    if arr.len() > 1 {
        let last = arr.len() - 1;
        merge_sort(&mut arr, 0, last, &mut recorder);
    }

    recorder.finish(arr)
}

/// Sort the inclusive range `left..=right`.
fn merge_sort<T: Ord + Clone>(
    arr: &mut [T],
    left: usize,
    right: usize,
    recorder: &mut StepRecorder<T>,
) {
    if left >= right {
        return;
    }
    let mid = left + (right - left) / 2;
    merge_sort(arr, left, mid, recorder);
    merge_sort(arr, mid + 1, right, recorder);
    merge(arr, left, mid, right, recorder);
}

/// Merge the sorted runs `left..=mid` and `mid+1..=right`.
fn merge<T: Ord + Clone>(
    arr: &mut [T],
    left: usize,
    mid: usize,
    right: usize,
    recorder: &mut StepRecorder<T>,
) {
    let left_run = arr[left..=mid].to_vec();
    let right_run = arr[mid + 1..=right].to_vec();

    let (mut i, mut j, mut k) = (0, 0, left);
    while i < left_run.len() && j < right_run.len() {
        if left_run[i] <= right_run[j] {
            arr[k] = left_run[i].clone();
            i += 1;
        } else {
            arr[k] = right_run[j].clone();
            j += 1;
        }
        k += 1;
        recorder.record(arr);
    }
    for value in left_run[i..].iter().chain(&right_run[j..]) {
        arr[k] = value.clone();
        k += 1;
        recorder.record(arr);
    }
}
