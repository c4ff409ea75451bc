//! Byte-level tokenizer for `key;value` records.
//!
//! Values are read as fixed-point integers scaled by ten: `-3.4` scans to `-34`.
//! Nothing is allocated; keys are returned as slices of the input buffer.

use std::ops::Range;

use crate::error::{Error, MalformedReason};

pub const DELIMITER: u8 = b';';
pub const LINE_FEED: u8 = b'\n';
pub const CARRIAGE_RETURN: u8 = b'\r';

#[inline]
pub fn is_terminator(byte: u8) -> bool {
    byte == LINE_FEED || byte == CARRIAGE_RETURN
}

/// A rejected token, located by absolute byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanError {
    pub offset: usize,
    pub reason: MalformedReason,
}

impl ScanError {
    fn new(offset: usize, reason: MalformedReason) -> Self {
        Self { offset, reason }
    }

    pub fn in_partition(self, partition: usize) -> Error {
        Error::MalformedRecord {
            partition,
            offset: self.offset,
            reason: self.reason,
        }
    }
}

/// Offset just past the terminator at `at`. CR LF counts as one terminator.
#[inline]
fn skip_terminator(buffer: &[u8], at: usize) -> usize {
    if buffer[at] == CARRIAGE_RETURN && buffer.get(at + 1) == Some(&LINE_FEED) {
        at + 2
    } else {
        at + 1
    }
}

/// First record start at or after `position`, treating `position` as if it
/// were in the middle of a value. Returns `buffer.len()` when no terminator follows.
#[inline]
pub fn next_record_start(buffer: &[u8], position: usize) -> usize {
    buffer[position..]
        .iter()
        .position(|&b| is_terminator(b))
        .map(|x| skip_terminator(buffer, position + x))
        .unwrap_or_else(|| buffer.len())
}

/// True when `offset` is exactly where a record may begin.
pub fn is_record_start(buffer: &[u8], offset: usize) -> bool {
    if offset == 0 {
        return true;
    }
    match buffer.get(offset - 1) {
        Some(&LINE_FEED) => true,
        // the LF of a CR LF pair is still part of the terminator
        Some(&CARRIAGE_RETURN) => buffer.get(offset) != Some(&LINE_FEED),
        _ => false,
    }
}

/// Cursor over one record-aligned range of a buffer.
pub struct Scanner<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> Scanner<'a> {
    /// Bytes past `range.end` are never read, so the end of the range behaves
    /// like the end of the buffer. `range` must lie within `buffer`.
    pub fn new(buffer: &'a [u8], range: Range<usize>) -> Self {
        Self {
            buffer: &buffer[..range.end],
            position: range.start,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.buffer.len()
    }

    /// Reads the key up to the delimiter and moves past the delimiter.
    pub fn next_key(&mut self) -> Result<&'a [u8], ScanError> {
        let start = self.position;
        for (i, &b) in self.buffer[start..].iter().enumerate() {
            if b == DELIMITER {
                if i == 0 {
                    return Err(ScanError::new(start, MalformedReason::EmptyKey));
                }
                self.position = start + i + 1;
                return Ok(&self.buffer[start..start + i]);
            }
            if is_terminator(b) {
                break;
            }
        }
        Err(ScanError::new(start, MalformedReason::MissingDelimiter))
    }

    /// Reads `-?[0-9]+\.[0-9]` as tenths and moves past exactly one terminator.
    /// The final record of the buffer does not need a terminator.
    pub fn next_value(&mut self) -> Result<i64, ScanError> {
        let buffer = self.buffer;
        let mut i = self.position;

        let negative = buffer.get(i) == Some(&b'-');
        if negative {
            i += 1;
        }

        let digits_start = i;
        let mut value: i64 = 0;
        while let Some(&b) = buffer.get(i) {
            if !b.is_ascii_digit() {
                break;
            }
            value = push_digit(value, b).ok_or(ScanError::new(i, MalformedReason::Overflow))?;
            i += 1;
        }
        if i == digits_start {
            return Err(ScanError::new(i, MalformedReason::MissingDigits));
        }

        if buffer.get(i) != Some(&b'.') {
            return Err(ScanError::new(i, MalformedReason::MissingDecimalPoint));
        }
        i += 1;

        match buffer.get(i) {
            Some(&b) if b.is_ascii_digit() => {
                value = push_digit(value, b).ok_or(ScanError::new(i, MalformedReason::Overflow))?;
                i += 1;
            }
            _ => return Err(ScanError::new(i, MalformedReason::MissingFraction)),
        }

        i = match buffer.get(i) {
            None => i,
            Some(&b) if is_terminator(b) => skip_terminator(buffer, i),
            Some(_) => return Err(ScanError::new(i, MalformedReason::TrailingBytes)),
        };

        self.position = i;
        Ok(if negative { -value } else { value })
    }
}

#[inline]
fn push_digit(value: i64, digit: u8) -> Option<i64> {
    value.checked_mul(10)?.checked_add(i64::from(digit - b'0'))
}

/// Parses a complete value token such as `b"-12.3"` into tenths.
pub fn parse_tenths(text: &[u8]) -> Result<i64, ScanError> {
    let mut scanner = Scanner::new(text, 0..text.len());
    let value = scanner.next_value()?;
    if !scanner.is_exhausted() {
        return Err(ScanError::new(scanner.position(), MalformedReason::TrailingBytes));
    }
    Ok(value)
}
