//! Half-open UTC interval used to bound one remote request.

use chrono::{DateTime, Utc};
use snafu::{Snafu, ensure};

#[derive(Debug, Snafu)]
#[snafu(display("date range start {start} must be before end {end}"))]
pub struct EmptyRangeError {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// `[start, end)` with `start < end` guaranteed by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, EmptyRangeError> {
        ensure!(start < end, EmptyRangeSnafu { start, end });
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}
