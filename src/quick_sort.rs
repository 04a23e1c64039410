//! Quick Sort
//!
//! Lomuto partitioning around a median-of-three pivot. Recursion is replaced
//! by an explicit stack of index ranges: after each partition the larger side
//! is pushed and the loop continues on the smaller side, so the stack never
//! holds more than O(log n) ranges even on sorted or reverse-sorted input.
//!
//! Complexity: O(n log n) average, O(n²) worst case. Not stable.

use crate::trace::{SortOutput, StepOptions, StepRecorder};

/// Sort a copy of `items`, optionally recording snapshots.
///
/// A snapshot is taken after every swap in the partition loop and after the
/// pivot is placed.
pub fn sort<T: Ord + Clone>(items: &[T], options: StepOptions) -> SortOutput<T> {
    let mut arr = items.to_vec();
    let mut recorder = StepRecorder::new(options);

    if arr.len() > 1 {
        let mut stack: Vec<(usize, usize)> = vec![(0, arr.len() - 1)];

        while let Some((mut lo, mut hi)) = stack.pop() {
            while lo < hi {
                let p = partition(&mut arr, lo, hi, &mut recorder);
                let left_len = p - lo;
                let right_len = hi - p;

                if left_len < right_len {
                    if p + 1 < hi {
                        stack.push((p + 1, hi));
                    }
                    if p == lo {
                        break;
                    }
                    hi = p - 1;
                } else {
                    if p > lo + 1 {
                        stack.push((lo, p - 1));
                    }
                    if p >= hi {
                        break;
                    }
                    lo = p + 1;
                }
            }
        }
    }

    recorder.finish(arr)
}

/// Order `lo`, `mid` and `hi`, then move the median into `hi` as the pivot.
fn select_pivot<T: Ord>(arr: &mut [T], lo: usize, hi: usize) {
    let mid = lo + (hi - lo) / 2;
    if arr[mid] < arr[lo] {
        arr.swap(lo, mid);
    }
    if arr[hi] < arr[lo] {
        arr.swap(lo, hi);
    }
    if arr[hi] < arr[mid] {
        arr.swap(mid, hi);
    }
    arr.swap(mid, hi);
}

fn partition<T: Ord + Clone>(
    arr: &mut [T],
    lo: usize,
    hi: usize,
    recorder: &mut StepRecorder<T>,
) -> usize {
    select_pivot(arr, lo, hi);
    let pivot = arr[hi].clone();

    let mut i = lo;
    for j in lo..hi {
        if arr[j] <= pivot {
            arr.swap(i, j);
            recorder.record(arr);
            i += 1;
        }
    }
    arr.swap(i, hi);
    recorder.record(arr);
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::is_sorted;
    use rand::Rng;

    fn sorted_copy(data: &[i64]) -> Vec<i64> {
        let mut expected = data.to_vec();
        expected.sort();
        expected
    }

    #[test]
    fn test_sort_empty() {
        let out = sort::<i64>(&[], StepOptions::recording(10));
        assert!(out.sorted.is_empty());
        assert!(out.steps.is_empty());
    }

    #[test]
    fn test_sort_single() {
        let out = sort(&[42], StepOptions::default());
        assert_eq!(out.sorted, vec![42]);
    }

    #[test]
    fn test_sort_two() {
        assert_eq!(sort(&[5, 3], StepOptions::default()).sorted, vec![3, 5]);
        assert_eq!(sort(&[3, 5], StepOptions::default()).sorted, vec![3, 5]);
    }

    #[test]
    fn test_sort_duplicates() {
        let data = vec![5, 3, 5, 1, 3, 5, 1, 1];
        let out = sort(&data, StepOptions::default());
        assert_eq!(out.sorted, vec![1, 1, 1, 3, 3, 5, 5, 5]);
    }

    #[test]
    fn test_sort_all_same() {
        let data = vec![7i64; 200];
        let out = sort(&data, StepOptions::default());
        assert_eq!(out.sorted, data);
    }

    #[test]
    fn test_sort_negative_values() {
        let out = sort(&[3, -1, 2], StepOptions::default());
        assert_eq!(out.sorted, vec![-1, 2, 3]);
    }

    #[test]
    fn test_sort_random() {
        let mut rng = rand::thread_rng();
        let data: Vec<i64> = (0..2000).map(|_| rng.gen_range(-10_000..10_000)).collect();
        let out = sort(&data, StepOptions::default());
        assert!(is_sorted(&out.sorted));
        assert_eq!(out.sorted, sorted_copy(&data));
    }

    #[test]
    fn test_sort_large_sorted_and_reverse() {
        let ascending: Vec<i64> = (0..20_000).collect();
        assert_eq!(sort(&ascending, StepOptions::default()).sorted, ascending);

        let descending: Vec<i64> = (0..20_000).rev().collect();
        assert_eq!(sort(&descending, StepOptions::default()).sorted, ascending);
    }

    #[test]
    fn test_input_not_mutated() {
        let data = vec![4, 2, 3, 1];
        let _ = sort(&data, StepOptions::recording(5));
        assert_eq!(data, vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_steps_capped() {
        let data: Vec<i64> = (0..300).rev().collect();
        for limit in [0, 1, 7, 50] {
            let out = sort(&data, StepOptions::recording(limit));
            assert!(out.steps.len() <= limit);
            assert!(out.steps.iter().all(|s| s.len() == data.len()));
        }
    }

    #[test]
    fn test_steps_are_permutations_of_input() {
        let data = vec![3, 1, 2, 5, 4, 4, 0];
        let out = sort(&data, StepOptions::recording(400));
        assert!(!out.steps.is_empty());
        for step in &out.steps {
            assert_eq!(sorted_copy(step), sorted_copy(&data));
        }
    }

    #[test]
    fn test_no_steps_when_disabled() {
        let out = sort(&[9, 8, 7, 6], StepOptions::default());
        assert!(out.steps.is_empty());
    }
}
