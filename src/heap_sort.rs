//! Heap Sort
//!
//! Builds a max-heap bottom-up, then repeatedly swaps the root with the last
//! unsorted element and sifts the new root down.
//!
//! Complexity: O(n log n) in all cases. In place, not stable.

use crate::trace::{SortOutput, StepOptions, StepRecorder};

/// Sort a copy of `items`, optionally recording snapshots.
///
/// A snapshot is taken after every swap during sift-down and after every root
/// extraction swap.
pub fn sort<T: Ord + Clone>(items: &[T], options: StepOptions) -> SortOutput<T> {
    let mut arr = items.to_vec();
    let mut recorder = StepRecorder::new(options);
    let n = arr.len();

    // Build max heap
    for i in (0..n / 2).rev() {
        sift_down(&mut arr, n, i, &mut recorder);
    }

    // Extract elements from heap
    for end in (1..n).rev() {
        arr.swap(0, end);
        recorder.record(&arr);
        sift_down(&mut arr, end, 0, &mut recorder);
    }

    recorder.finish(arr)
}

/// Restore the max-heap property for the subtree rooted at `root`, looking
/// only at the first `len` elements.
fn sift_down<T: Ord + Clone>(
    arr: &mut [T],
    len: usize,
    mut root: usize,
    recorder: &mut StepRecorder<T>,
) {
    loop {
        let left = 2 * root + 1;
        let right = left + 1;
        let mut largest = root;

        if left < len && arr[left] > arr[largest] {
            largest = left;
        }
        if right < len && arr[right] > arr[largest] {
            largest = right;
        }
        if largest == root {
            return;
        }

        arr.swap(root, largest);
        recorder.record(arr);
        root = largest;
    }
}
