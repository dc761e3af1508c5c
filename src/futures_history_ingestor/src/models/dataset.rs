//! Final per-symbol table: ordered by timestamp, free of exact duplicates.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// One bar row. `values` is aligned to [`Dataset::columns`]; the timestamp
/// cell already holds the canonical text of `timestamp`.
#[derive(Debug, Clone, PartialEq)]
pub struct BarRecord {
    pub timestamp: DateTime<Utc>,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<BarRecord>,
}

impl Dataset {
    /// Callers must pass records already sorted and de-duplicated; see
    /// [`crate::assembly::assemble`].
    pub(crate) fn new(columns: Vec<String>, records: Vec<BarRecord>) -> Self {
        Self { columns, records }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[BarRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.records.len(), self.columns.len())
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.records.first().map(|r| r.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.records.last().map(|r| r.timestamp)
    }
}

/// Text form stored in, and exported from, the timestamp column.
pub fn canonical_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
