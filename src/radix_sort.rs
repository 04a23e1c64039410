//! Radix Sort
//!
//! LSD (least significant digit) radix sort in base 10. Each pass distributes
//! the elements into ten buckets by the current decimal digit and writes them
//! back bucket by bucket; every pass is stable, so the whole sort is stable.
//! Passes continue while the maximum key still has digits left.
//!
//! Only non-negative integer keys are supported.
//!
//! Complexity: O(d * (n + k)) where d is the digit count of the maximum key
//! and k = 10.

use crate::error::{LabError, Result};
use crate::trace::{SortOutput, StepOptions, StepRecorder};

/// Number of buckets (decimal digits)
const NUM_BUCKETS: usize = 10;

/// Sort a copy of `items`, optionally recording snapshots.
///
/// Fails with [`LabError::InvalidInput`] if any value is negative; the check
/// runs before any sorting pass.
pub fn sort(items: &[i64], options: StepOptions) -> Result<SortOutput<i64>> {
    sort_by_key(items, |&value| value, options)
}

/// Sort a copy of `items` by a non-negative integer key.
///
/// Elements with equal keys keep their input order. A snapshot is taken after
/// every element written back from a bucket.
pub fn sort_by_key<T, F>(items: &[T], key: F, options: StepOptions) -> Result<SortOutput<T>>
where
    T: Clone,
    F: Fn(&T) -> i64,
{
    let mut arr = items.to_vec();
    let mut recorder = StepRecorder::new(options);
    if arr.is_empty() {
        return Ok(recorder.finish(arr));
    }

    if let Some(negative) = arr.iter().map(&key).find(|&k| k < 0) {
        return Err(LabError::invalid(format!(
            "radix sort only supports non-negative integers, found {}",
            negative
        )));
    }

    let max_key = arr.iter().map(&key).max().unwrap_or(0) as u64;
    let mut buckets: Vec<Vec<T>> = vec![Vec::new(); NUM_BUCKETS];
    let mut exp: u64 = 1;

    while max_key / exp > 0 {
        for value in arr.iter() {
            let digit = ((key(value) as u64 / exp) % NUM_BUCKETS as u64) as usize;
            buckets[digit].push(value.clone());
        }

        let mut pos = 0;
        for bucket in buckets.iter_mut() {
            for value in bucket.drain(..) {
                arr[pos] = value;
                pos += 1;
                recorder.record(&arr);
            }
        }

        exp = match exp.checked_mul(NUM_BUCKETS as u64) {
            Some(next) => next,
            None => break,
        };
    }

    Ok(recorder.finish(arr))
}
