use std::ops::Range;
use std::time::Instant;

use tracing::debug;

use crate::error::{Error, Result};
use crate::scanner::{is_record_start, Scanner};
use crate::stats::{PartitionResult, Statistic};

/// Scans one record-aligned range and folds every record into per-key statistics.
///
/// Runs on the calling thread without synchronisation; the returned map is
/// owned by the caller. A range that is not record aligned, or any record that
/// fails to scan, aborts the whole partition.
pub fn aggregate(
    buffer: &[u8],
    range: Range<usize>,
    partition: usize,
) -> Result<PartitionResult<'_>> {
    if range.start > range.end || range.end > buffer.len() {
        return Err(Error::PartitionBoundary {
            partition,
            offset: range.start.min(buffer.len()),
        });
    }
    if !range.is_empty() && !is_record_start(buffer, range.start) {
        return Err(Error::PartitionBoundary {
            partition,
            offset: range.start,
        });
    }

    let started = Instant::now();
    let bytes = range.len();
    let mut result = PartitionResult::default();
    let mut records: u64 = 0;
    let mut scanner = Scanner::new(buffer, range);
    while !scanner.is_exhausted() {
        let key = scanner.next_key().map_err(|e| e.in_partition(partition))?;
        let value = scanner.next_value().map_err(|e| e.in_partition(partition))?;
        result
            .entry(key)
            .or_insert_with(Statistic::identity)
            .add(value);
        records += 1;
    }

    debug!(
        partition,
        bytes,
        records,
        keys = result.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "partition aggregated"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedReason;

    #[test]
    fn aggregates_whole_buffer() {
        let input = b"Paris;12.3\nParis;-1.0\nOslo;0.0\n";
        let result = aggregate(input, 0..input.len(), 0).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(
            result[&b"Paris"[..]],
            Statistic {
                sum: 113,
                count: 2,
                min: -10,
                max: 123,
            }
        );
        assert_eq!(result[&b"Oslo"[..]], Statistic::of(0));
    }

    #[test]
    fn empty_range_contributes_nothing() {
        let input = b"Paris;12.3\n";
        assert!(aggregate(input, 11..11, 3).unwrap().is_empty());
        assert!(aggregate(b"", 0..0, 0).unwrap().is_empty());
    }

    #[test]
    fn reads_only_its_own_range() {
        let input = b"a;1.0\nb;2.0\nc;3.0\n";
        let result = aggregate(input, 6..12, 1).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[&b"b"[..]], Statistic::of(20));
    }

    #[test]
    fn misaligned_range_is_rejected() {
        let input = b"Paris;12.3\nOslo;0.0\n";
        assert!(matches!(
            aggregate(input, 3..input.len(), 1),
            Err(Error::PartitionBoundary { partition: 1, offset: 3 })
        ));
        assert!(matches!(
            aggregate(input, 0..input.len() + 1, 0),
            Err(Error::PartitionBoundary { partition: 0, .. })
        ));
    }

    #[test]
    fn truncated_record_reports_partition_and_offset() {
        let input = b"Paris;12.3\nOslo;";
        match aggregate(input, 0..input.len(), 2) {
            Err(Error::MalformedRecord { partition, offset, reason }) => {
                assert_eq!(partition, 2);
                assert_eq!(offset, input.len());
                assert_eq!(reason, MalformedReason::MissingDigits);
            }
            other => panic!("expected malformed record, got {other:?}"),
        }
    }
}
