//! Renders a final result as `KEY=MIN/AVG/MAX,` lines sorted by key.

use std::fmt;
use std::io::{self, Write};

use crate::stats::{FinalResult, Statistic};

/// A value scaled by ten, printed with exactly one fractional digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenths(pub i64);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "{}.{}", abs / 10, abs % 10)
    }
}

/// One output line without the trailing newline.
pub struct Line<'a> {
    pub key: &'a [u8],
    pub stat: &'a Statistic,
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mean = self.stat.mean_tenths().unwrap_or(0);
        write!(
            f,
            "{}={}/{}/{},",
            String::from_utf8_lossy(self.key),
            Tenths(self.stat.min),
            Tenths(mean),
            Tenths(self.stat.max)
        )
    }
}

/// Writes one line per key, sorted by key, straight into `out`.
pub fn write_results<W: Write>(out: &mut W, result: &FinalResult<'_>) -> io::Result<()> {
    for (key, stat) in result.sorted() {
        writeln!(out, "{}", Line { key, stat: &stat })?;
    }
    Ok(())
}
