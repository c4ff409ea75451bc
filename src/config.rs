use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;

use clap::Parser;

use crate::coordinator::available_workers;

/// Per-key min/mean/max over a `key;value` measurements file.
#[derive(Parser, Debug, Clone)]
#[command(name = "brc-aggregate", version, about)]
pub struct Args {
    /// Measurements file, one `key;value` record per line
    pub path: PathBuf,

    /// Number of partitions to split the file into (defaults to available cores)
    #[arg(short, long, env = "BRC_WORKERS")]
    pub workers: Option<NonZeroUsize>,

    /// Run the pipeline this many times and log the timings
    #[arg(long, env = "BRC_REPEAT", default_value_t = NonZeroU32::MIN)]
    pub repeat: NonZeroU32,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn workers(&self) -> usize {
        self.workers.map(NonZeroUsize::get).unwrap_or_else(available_workers)
    }
}
