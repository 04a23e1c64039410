//! Algorithm Registry
//!
//! Maps the fixed algorithm keys to their implementations. The registry is an
//! immutable value built once and passed by reference to whatever needs to
//! dispatch by key; it holds no mutable state and can be shared across
//! threads.

use std::fmt;

use crate::error::{LabError, Result};
use crate::trace::{SortOutput, StepOptions};
use crate::{heap_sort, merge_sort, quick_sort, radix_sort, shell_sort};

/// Uniform entry point for every registered algorithm.
pub type SortFn = fn(&[i64], StepOptions) -> Result<SortOutput<i64>>;

/// A registered sorting algorithm.
#[derive(Clone, Copy)]
pub struct Algorithm {
    /// Lookup key (e.g. "quick")
    pub key: &'static str,
    /// Human-readable name (e.g. "Quick Sort")
    pub name: &'static str,
    /// Whether equal elements keep their input order
    pub stable: bool,
    /// Whether the algorithm works without an auxiliary buffer
    pub in_place: bool,
    pub func: SortFn,
}

impl Algorithm {
    /// Run this algorithm on `data`.
    pub fn run(&self, data: &[i64], options: StepOptions) -> Result<SortOutput<i64>> {
        (self.func)(data, options)
    }
}

impl fmt::Debug for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Algorithm")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("stable", &self.stable)
            .field("in_place", &self.in_place)
            .finish_non_exhaustive()
    }
}

fn run_quick(data: &[i64], options: StepOptions) -> Result<SortOutput<i64>> {
    Ok(quick_sort::sort(data, options))
}

fn run_heap(data: &[i64], options: StepOptions) -> Result<SortOutput<i64>> {
    Ok(heap_sort::sort(data, options))
}

fn run_shell(data: &[i64], options: StepOptions) -> Result<SortOutput<i64>> {
    Ok(shell_sort::sort(data, options))
}

fn run_merge(data: &[i64], options: StepOptions) -> Result<SortOutput<i64>> {
    Ok(merge_sort::sort(data, options))
}

/// The fixed table, in registration order.
const ALGORITHMS: [Algorithm; 5] = [
    Algorithm {
        key: "quick",
        name: "Quick Sort",
        stable: false,
        in_place: true,
        func: run_quick,
    },
    Algorithm {
        key: "heap",
        name: "Heap Sort",
        stable: false,
        in_place: true,
        func: run_heap,
    },
    Algorithm {
        key: "shell",
        name: "Shell Sort",
        stable: false,
        in_place: true,
        func: run_shell,
    },
    Algorithm {
        key: "merge",
        name: "Merge Sort",
        stable: true,
        in_place: false,
        func: run_merge,
    },
    Algorithm {
        key: "radix",
        name: "Radix Sort",
        stable: true,
        in_place: false,
        func: radix_sort::sort,
    },
];

/// Immutable table of the available algorithms.
#[derive(Debug, Clone)]
pub struct Registry {
    algorithms: Vec<Algorithm>,
}

impl Registry {
    /// Build the registry with quick, heap, shell, merge and radix sort.
    pub fn new() -> Self {
        Registry {
            algorithms: ALGORITHMS.to_vec(),
        }
    }

    /// All descriptors in registration order.
    pub fn list(&self) -> &[Algorithm] {
        &self.algorithms
    }

    /// All keys in registration order.
    pub fn keys(&self) -> Vec<&'static str> {
        self.algorithms.iter().map(|a| a.key).collect()
    }

    /// Look up a descriptor by key.
    pub fn get(&self, key: &str) -> Result<&Algorithm> {
        self.algorithms
            .iter()
            .find(|a| a.key == key)
            .ok_or_else(|| LabError::UnknownAlgorithm(key.to_string()))
    }

    /// Run the algorithm registered under `key`.
    pub fn run(&self, key: &str, data: &[i64], options: StepOptions) -> Result<SortOutput<i64>> {
        self.get(key)?.run(data, options)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_list_order() {
        let registry = Registry::new();
        assert_eq!(registry.keys(), vec!["quick", "heap", "shell", "merge", "radix"]);
        let names: Vec<&str> = registry.list().iter().map(|a| a.name).collect();
        assert_eq!(
            names,
            vec!["Quick Sort", "Heap Sort", "Shell Sort", "Merge Sort", "Radix Sort"]
        );
    }

    #[test]
    fn test_unknown_key() {
        let registry = Registry::new();
        let err = registry.run("bogo", &[2, 1], StepOptions::default()).unwrap_err();
        assert!(matches!(err, LabError::UnknownAlgorithm(ref k) if k == "bogo"));
    }

    #[test]
    fn test_all_algorithms_sort_fixtures() {
        let registry = Registry::new();
        let fixtures: Vec<Vec<i64>> = vec![
            vec![],
            vec![1],
            vec![3, 1, 2, 5, 4, 4, 0],
            vec![10, 9, 8, 7, 6, 5, 4],
        ];
        for algo in registry.list() {
            for data in &fixtures {
                let mut expected = data.clone();
                expected.sort();
                let out = algo.run(data, StepOptions::recording(10)).unwrap();
                assert_eq!(out.sorted, expected, "{} failed", algo.key);
                assert!(out.steps.len() <= 10, "{} exceeded step limit", algo.key);
            }
        }
    }

    #[test]
    fn test_all_algorithms_random() {
        let registry = Registry::new();
        let mut rng = rand::thread_rng();
        let data: Vec<i64> = (0..1500).map(|_| rng.gen_range(0..15_000)).collect();
        let mut expected = data.clone();
        expected.sort();
        for algo in registry.list() {
            let out = algo.run(&data, StepOptions::default()).unwrap();
            assert_eq!(out.sorted, expected, "{} failed", algo.key);
            assert!(out.steps.is_empty());
        }
    }

    #[test]
    fn test_negative_values_only_fail_radix() {
        let registry = Registry::new();
        for algo in registry.list() {
            let result = algo.run(&[3, -1, 2], StepOptions::default());
            if algo.key == "radix" {
                assert!(matches!(result, Err(LabError::InvalidInput(_))));
            } else {
                assert_eq!(result.unwrap().sorted, vec![-1, 2, 3]);
            }
        }
    }

    #[test]
    fn test_quick_end_to_end() {
        let registry = Registry::new();
        let out = registry
            .run("quick", &[3, 1, 2, 5, 4, 4, 0], StepOptions::recording(10))
            .unwrap();
        assert_eq!(out.sorted, vec![0, 1, 2, 3, 4, 4, 5]);
        assert!(out.steps.len() <= 10);
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
