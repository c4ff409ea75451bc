//! Splits a buffer into contiguous, record-aligned ranges.

use std::ops::Range;

use crate::error::{Error, Result};
use crate::scanner::next_record_start;

/// Divides `buffer` into exactly `count` ranges that cover it without gap or
/// overlap. Every range starts at a record start; ranges may be empty when the
/// buffer holds fewer records than `count`.
pub fn partition(buffer: &[u8], count: usize) -> Result<Vec<Range<usize>>> {
    if count == 0 {
        return Err(Error::InvalidWorkerCount);
    }

    let stride = buffer.len() / count;
    let mut boundaries = Vec::with_capacity(count + 1);
    boundaries.push(0);
    for i in 1..count {
        let previous = boundaries[i - 1];
        let proposed = i * stride;
        let boundary = if proposed <= previous {
            previous
        } else {
            next_record_start(buffer, proposed)
        };
        boundaries.push(boundary);
    }
    boundaries.push(buffer.len());

    Ok(boundaries.windows(2).map(|w| w[0]..w[1]).collect())
}

/// Non-empty ranges paired with their partition index.
pub fn non_empty(ranges: &[Range<usize>]) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
    ranges
        .iter()
        .enumerate()
        .filter(|(_, range)| !range.is_empty())
        .map(|(index, range)| (index, range.clone()))
}
