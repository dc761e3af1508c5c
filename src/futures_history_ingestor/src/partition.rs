//! Splits a long history request into bounded, contiguous sub-ranges.

use chrono::{DateTime, TimeDelta, Utc};
use snafu::{Snafu, ensure};

use crate::models::date_range::DateRange;

#[derive(Debug, Snafu)]
pub enum PartitionError {
    #[snafu(display("chunk duration must be positive, got {chunk}"))]
    NonPositiveChunk { chunk: TimeDelta },
}

/// Partitions `[start, end)` into `[cursor, min(cursor + chunk, end))` steps.
///
/// The ranges are returned in cursor order, do not overlap, leave no gaps and
/// the last one ends exactly at `end`. `start >= end` yields no ranges.
pub fn partition(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    chunk: TimeDelta,
) -> Result<Vec<DateRange>, PartitionError> {
    ensure!(chunk > TimeDelta::zero(), NonPositiveChunkSnafu { chunk });

    let mut ranges = Vec::new();
    let mut cursor = start;
    while cursor < end {
        // Saturate instead of overflowing near DateTime::MAX_UTC.
        let next = cursor.checked_add_signed(chunk).map_or(end, |n| n.min(end));
        // cursor < next always holds here, so construction cannot fail.
        if let Ok(range) = DateRange::new(cursor, next) {
            ranges.push(range);
        }
        cursor = next;
    }
    Ok(ranges)
}
