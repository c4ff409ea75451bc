//! Parallel min/mean/max aggregation over `key;value` measurement files.
//!
//! The buffer is split into record-aligned partitions, each partition is
//! scanned on its own worker into a private map, and the maps are merged
//! once every worker has finished.

pub mod aggregate;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod format;
pub mod input;
pub mod merge;
pub mod partition;
pub mod scanner;
pub mod stats;

pub use coordinator::{run, Coordinator};
pub use error::{Error, MalformedReason, Result};
pub use stats::{FinalResult, PartitionResult, Statistic};
