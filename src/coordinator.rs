//! Fans partitions out to a worker pool and folds the partial results.

use std::num::NonZeroUsize;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::aggregate::aggregate;
use crate::error::{Error, Result};
use crate::merge::merge;
use crate::partition::{non_empty, partition};
use crate::stats::{FinalResult, PartitionResult};

/// Upper bound on worker threads when nothing else is known.
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Owns the worker pool, so repeated runs reuse the same threads.
#[derive(Debug)]
pub struct Coordinator {
    partitions: usize,
    pool: rayon::ThreadPool,
}

impl Coordinator {
    /// `partitions` is advisory: small inputs may produce fewer non-empty ranges.
    pub fn new(partitions: usize) -> Result<Self> {
        Self::with_max_threads(partitions, available_workers())
    }

    /// Like `new`, but caps the pool below the host's processing units.
    pub fn with_max_threads(partitions: usize, max_threads: usize) -> Result<Self> {
        if partitions == 0 {
            return Err(Error::InvalidWorkerCount);
        }
        let threads = partitions.min(max_threads.max(1));
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("brc-worker-{i}"))
            .build()?;
        debug!(partitions, threads, "worker pool started");
        Ok(Self { partitions, pool })
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Aggregates `buffer` with one task per non-empty partition.
    ///
    /// All tasks finish before any merging starts. The first failing
    /// partition fails the run and no partial result is returned.
    pub fn run<'a>(&self, buffer: &'a [u8]) -> Result<FinalResult<'a>> {
        let started = Instant::now();
        let ranges = partition(buffer, self.partitions)?;
        let tasks: Vec<_> = non_empty(&ranges).collect();
        info!(
            phase = "partition",
            bytes = buffer.len(),
            requested = self.partitions,
            non_empty = tasks.len(),
            "buffer partitioned"
        );
        if tasks.is_empty() {
            return Ok(FinalResult::default());
        }

        let threads = self.threads();
        let merged = self.pool.install(|| -> Result<PartitionResult<'a>> {
            let partials = tasks
                .into_par_iter()
                .map(|(index, range)| aggregate(buffer, range, index))
                .collect::<Result<Vec<_>>>()?;
            info!(
                phase = "aggregate",
                threads,
                partitions = partials.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "all partitions aggregated"
            );

            let merge_started = Instant::now();
            let merged = partials
                .into_par_iter()
                .reduce(PartitionResult::default, merge);
            debug!(
                phase = "merge",
                keys = merged.len(),
                elapsed_ms = merge_started.elapsed().as_millis() as u64,
                "partial results merged"
            );
            Ok(merged)
        })?;

        info!(
            keys = merged.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "run complete"
        );
        Ok(FinalResult::new(merged))
    }
}

/// One-shot helper: `Coordinator::new(workers)?.run(buffer)`.
pub fn run(buffer: &[u8], workers: usize) -> Result<FinalResult<'_>> {
    Coordinator::new(workers)?.run(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedReason;
    use crate::stats::Statistic;

    const INPUT: &[u8] = b"Paris;12.3\nParis;-1.0\nOslo;0.0\n";

    #[test]
    fn zero_workers_is_rejected() {
        assert!(matches!(Coordinator::new(0), Err(Error::InvalidWorkerCount)));
        assert!(matches!(
            Coordinator::with_max_threads(0, 4),
            Err(Error::InvalidWorkerCount)
        ));
        assert!(matches!(run(INPUT, 0), Err(Error::InvalidWorkerCount)));
    }

    #[test]
    fn two_workers_match_reference_example() {
        let result = run(INPUT, 2).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(
            result.get(b"Paris"),
            Some(&Statistic {
                sum: 113,
                count: 2,
                min: -10,
                max: 123,
            })
        );
        assert_eq!(result.get(b"Oslo"), Some(&Statistic::of(0)));
    }

    #[test]
    fn worker_count_does_not_change_result() {
        let expected = run(INPUT, 1).unwrap();
        for workers in 2..=INPUT.len() + 4 {
            assert_eq!(run(INPUT, workers).unwrap(), expected, "workers = {workers}");
        }
    }

    #[test]
    fn single_thread_pool_still_covers_all_partitions() {
        let coordinator = Coordinator::with_max_threads(8, 1).unwrap();
        assert_eq!(coordinator.threads(), 1);
        assert_eq!(coordinator.run(INPUT).unwrap(), run(INPUT, 1).unwrap());
    }

    #[test]
    fn pool_never_exceeds_partition_count() {
        let coordinator = Coordinator::with_max_threads(2, 64).unwrap();
        assert_eq!(coordinator.threads(), 2);
    }

    #[test]
    fn coordinator_is_reusable_across_runs() {
        let coordinator = Coordinator::with_max_threads(4, 2).unwrap();
        let first = coordinator.run(INPUT).unwrap();
        let other = b"Rome;1.0\nRome;3.0\n";
        let rome = coordinator.run(other).unwrap();
        assert_eq!(rome.get(b"Rome").map(|s| s.count), Some(2));
        assert_eq!(coordinator.run(INPUT).unwrap(), first);
    }

    #[test]
    fn empty_buffer_yields_empty_result() {
        assert!(run(b"", 4).unwrap().is_empty());
    }

    #[test]
    fn any_bad_partition_fails_the_run() {
        let input = b"Paris;12.3\nParis;-1.0\nOslo;0.0\nRome;oops\n";
        for workers in 1..=4 {
            match run(input, workers) {
                Err(Error::MalformedRecord { offset, reason, .. }) => {
                    assert_eq!(offset, 36);
                    assert_eq!(reason, MalformedReason::MissingDigits);
                }
                other => panic!("workers = {workers}: expected failure, got {other:?}"),
            }
        }
    }
}
