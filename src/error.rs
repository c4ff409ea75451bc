use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a run. All of these are fatal: a run either
/// produces the full result or nothing.
#[derive(Debug, Error)]
pub enum Error {
    /// A record could not be parsed as `key;value`.
    #[error("malformed record in partition {partition} at byte {offset}: {reason}")]
    MalformedRecord {
        partition: usize,
        offset: usize,
        reason: MalformedReason,
    },

    /// A partition does not start at the beginning of a record or runs past the buffer.
    #[error("partition {partition} is not record aligned at byte {offset}")]
    PartitionBoundary { partition: usize, offset: usize },

    /// The input file could not be resolved, opened or mapped.
    #[error("input unavailable: {}", .path.display())]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("failed to start worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Why a single record was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("record has no `;` delimiter")]
    MissingDelimiter,
    #[error("record has an empty key")]
    EmptyKey,
    #[error("value has no integer digits")]
    MissingDigits,
    #[error("value has no decimal point")]
    MissingDecimalPoint,
    #[error("value has no fractional digit")]
    MissingFraction,
    #[error("unexpected bytes after the fractional digit")]
    TrailingBytes,
    #[error("value does not fit in 64 bits")]
    Overflow,
}
