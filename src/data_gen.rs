//! Dataset Generation
//!
//! Synthetic integer arrays in three shapes: uniform random, partially sorted
//! and reverse sorted. Seeded generation uses ChaCha8 (`rand_chacha`), whose
//! output stream is fixed by its algorithm, so a seed reproduces the same
//! array on every platform and release. Unseeded calls draw a seed from the OS.

use std::fmt;
use std::str::FromStr;

use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{LabError, Result};

/// Sorted ratio used by [`generate`] for partially sorted datasets.
pub const DEFAULT_SORTED_RATIO: f64 = 0.5;

/// Shape of a generated dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    Random,
    Partial,
    Reverse,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 3] = [DatasetKind::Random, DatasetKind::Partial, DatasetKind::Reverse];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Random => "random",
            DatasetKind::Partial => "partial",
            DatasetKind::Reverse => "reverse",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "random" => Ok(DatasetKind::Random),
            "partial" | "partially_sorted" => Ok(DatasetKind::Partial),
            "reverse" => Ok(DatasetKind::Reverse),
            other => Err(LabError::invalid(format!("unknown dataset type: {}", other))),
        }
    }
}

fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Upper bound (inclusive) of generated values for an array of length `n`.
fn value_bound(n: usize) -> i64 {
    n as i64 * 10
}

/// `n` independent uniform draws from `[0, 10n]`.
pub fn random_array(n: usize, seed: Option<u64>) -> Vec<i64> {
    let mut rng = make_rng(seed);
    let bound = value_bound(n);
    (0..n).map(|_| rng.gen_range(0..=bound)).collect()
}

/// A mostly sorted array of `n` distinct values from `[0, 10n]`.
///
/// Roughly `sorted_ratio` of the positions keep their sorted value; the values
/// at the remaining `max(1, floor(n * (1 - sorted_ratio)))` positions are
/// shuffled among themselves. If that shuffle happens to leave the array
/// sorted, the first and last elements are swapped, so for `n > 1` and a ratio
/// below 1 the result is never fully sorted. A ratio of exactly 1 returns the
/// sorted array.
pub fn partially_sorted_array(n: usize, sorted_ratio: f64, seed: Option<u64>) -> Result<Vec<i64>> {
    if !(0.0..=1.0).contains(&sorted_ratio) {
        return Err(LabError::invalid(format!(
            "sorted_ratio must be between 0 and 1, got {}",
            sorted_ratio
        )));
    }
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut rng = make_rng(seed);
    let population = value_bound(n) as usize + 1;
    let mut values: Vec<i64> = index::sample(&mut rng, population, n)
        .into_iter()
        .map(|v| v as i64)
        .collect();
    values.sort_unstable();

    if n == 1 || sorted_ratio >= 1.0 {
        return Ok(values);
    }

    let shuffle_count = ((n as f64 * (1.0 - sorted_ratio)) as usize).max(1);
    let positions = index::sample(&mut rng, n, shuffle_count).into_vec();
    let mut subset: Vec<i64> = positions.iter().map(|&i| values[i]).collect();
    subset.shuffle(&mut rng);
    for (&pos, value) in positions.iter().zip(subset) {
        values[pos] = value;
    }

    if crate::trace::is_sorted(&values) && values[0] != values[n - 1] {
        values.swap(0, n - 1);
    }
    Ok(values)
}

/// The strictly descending sequence `n, n-1, ..., 1`.
pub fn reverse_sorted_array(n: usize) -> Vec<i64> {
    (1..=n as i64).rev().collect()
}

/// Generate a dataset by kind name (case-insensitive).
///
/// Accepted kinds: `random`, `partial` / `partially_sorted`, `reverse`.
pub fn generate(kind: &str, size: usize, seed: Option<u64>) -> Result<Vec<i64>> {
    generate_kind(kind.parse()?, size, seed)
}

/// Generate a dataset of a known kind.
pub fn generate_kind(kind: DatasetKind, size: usize, seed: Option<u64>) -> Result<Vec<i64>> {
    match kind {
        DatasetKind::Random => Ok(random_array(size, seed)),
        DatasetKind::Partial => partially_sorted_array(size, DEFAULT_SORTED_RATIO, seed),
        DatasetKind::Reverse => Ok(reverse_sorted_array(size)),
    }
}
