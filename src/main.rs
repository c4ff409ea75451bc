use std::io::{BufWriter, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use brc_aggregate::config::Args;
use brc_aggregate::{format, input, Coordinator, FinalResult};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let buffer = input::open(&args.path).context("failed to open measurements")?;
    let coordinator = Coordinator::new(args.workers())?;
    info!(
        path = %args.path.display(),
        bytes = buffer.len(),
        partitions = coordinator.partitions(),
        repeat = args.repeat.get(),
        "starting"
    );

    let (result, elapsed) = timeit(|| coordinator.run(&buffer), args.repeat.get())
        .context("failed to aggregate measurements")?;
    info!(mean_ms = elapsed.as_millis() as u64, runs = args.repeat.get(), "timing");

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    format::write_results(&mut out, &result)?;
    out.flush()?;
    Ok(())
}

/// Runs `f` `count` times, keeping the last result and the mean wall time.
fn timeit<'a, F>(f: F, count: u32) -> brc_aggregate::Result<(FinalResult<'a>, Duration)>
where
    F: Fn() -> brc_aggregate::Result<FinalResult<'a>>,
{
    let mut total = Duration::ZERO;
    let mut last = FinalResult::default();
    for run in 0..count.max(1) {
        let start = Instant::now();
        last = f()?;
        let elapsed = start.elapsed();
        info!(run, elapsed_ms = elapsed.as_millis() as u64, keys = last.len(), "run finished");
        total += elapsed;
    }
    Ok((last, total / count.max(1)))
}
