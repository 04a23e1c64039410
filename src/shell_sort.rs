//! Shell Sort
//!
//! Gapped insertion sort using Shell's original sequence: the gap starts at
//! n/2 and is halved after every pass until a final pass with gap 1.

use crate::trace::{SortOutput, StepOptions, StepRecorder};

/// Sort a copy of `items`, optionally recording snapshots.
///
/// A snapshot is taken after every shift and after the held element is
/// written to its final slot for the pass.
pub fn sort<T: Ord + Clone>(items: &[T], options: StepOptions) -> SortOutput<T> {
    let mut arr = items.to_vec();
    let mut recorder = StepRecorder::new(options);
    let n = arr.len();

    let mut gap = n / 2;
    while gap > 0 {
        for i in gap..n {
            let held = arr[i].clone();
            let mut j = i;
            while j >= gap && arr[j - gap] > held {
                arr[j] = arr[j - gap].clone();
                j -= gap;
                recorder.record(&arr);
            }
            arr[j] = held;
            recorder.record(&arr);
        }
        gap /= 2;
    }

    recorder.finish(arr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::is_sorted;
    use rand::Rng;

    #[test]
    fn test_sort_empty() {
        let out = sort::<i64>(&[], StepOptions::recording(5));
        assert!(out.sorted.is_empty());
        assert!(out.steps.is_empty());
    }

    #[test]
    fn test_sort_single() {
        let out = sort(&[1], StepOptions::recording(5));
        assert_eq!(out.sorted, vec![1]);
        assert!(out.steps.is_empty());
    }

    #[test]
    fn test_sort_reverse() {
        let data = vec![10, 9, 8, 7, 6, 5, 4];
        assert_eq!(
            sort(&data, StepOptions::default()).sorted,
            vec![4, 5, 6, 7, 8, 9, 10]
        );
    }

    #[test]
    fn test_sort_random() {
        let mut rng = rand::thread_rng();
        let data: Vec<i64> = (0..3000).map(|_| rng.gen_range(0..500)).collect();
        let mut expected = data.clone();
        expected.sort();

        let out = sort(&data, StepOptions::default());
        assert!(is_sorted(&out.sorted));
        assert_eq!(out.sorted, expected);
    }

    #[test]
    fn test_sorted_input_records_one_step_per_placement() {
        // Nothing shifts on sorted input, so only placements are recorded:
        // gap 2 covers i = 2, 3 and gap 1 covers i = 1, 2, 3.
        let data = vec![1, 2, 3, 4];
        let out = sort(&data, StepOptions::recording(100));
        assert_eq!(out.steps.len(), 5);
        assert!(out.steps.iter().all(|s| *s == data));
    }

    #[test]
    fn test_shift_snapshot_shows_duplicate() {
        // During a shift the moved element briefly appears twice.
        let out = sort(&[2, 1], StepOptions::recording(2));
        assert_eq!(out.steps, vec![vec![2, 2], vec![1, 2]]);
    }

    #[test]
    fn test_steps_capped() {
        let data: Vec<i64> = (0..200).rev().collect();
        let out = sort(&data, StepOptions::recording(10));
        assert_eq!(out.steps.len(), 10);
    }
}
