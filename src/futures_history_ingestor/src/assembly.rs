//! Fan-in of normalized chunks into one ordered, de-duplicated [`Dataset`].
//!
//! Steps, in order:
//! 1. concatenate every chunk table (outer union of columns, no row dropped);
//! 2. parse the timestamp column of every row, a failure aborts assembly;
//! 3. stable sort by timestamp ascending;
//! 4. drop rows equal in every column to an earlier row.
//!
//! Running [`assemble`] on `Table::from(&dataset)` returns `dataset` unchanged.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use indexmap::IndexSet;
use serde_json::Value;
use snafu::{OptionExt, Snafu};

use crate::models::{
    dataset::{BarRecord, Dataset, canonical_timestamp},
    table::Table,
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum AssemblyError {
    /// Rows were fetched but none of them carries the timestamp field.
    #[snafu(display("no `{column}` column among {rows} assembled rows"))]
    MissingTimestampColumn { column: String, rows: usize },

    /// A timestamp cell is absent or not a recognizable date-time.
    #[snafu(display("row {row}: cannot parse `{column}` value {value}"))]
    Timestamp {
        row: usize,
        column: String,
        value: String,
    },
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Concatenates tables in order. The result's columns are the union of all
/// input columns in first-seen order; cells a table lacks become null.
pub fn concat(tables: impl IntoIterator<Item = Table>) -> Table {
    let tables: Vec<Table> = tables.into_iter().collect();

    let mut columns = IndexSet::new();
    for table in &tables {
        for column in table.columns() {
            if !columns.contains(column) {
                columns.insert(column.clone());
            }
        }
    }

    let width = columns.len();
    let mut rows = Vec::with_capacity(tables.iter().map(Table::height).sum());
    for table in tables {
        let (table_columns, table_rows) = table.into_parts();
        let mapping: Vec<Option<usize>> = table_columns
            .iter()
            .map(|column| columns.get_index_of(column))
            .collect();

        for row in table_rows {
            let mut aligned = vec![Value::Null; width];
            for (i, value) in row.into_iter().enumerate() {
                if let Some(Some(dst)) = mapping.get(i) {
                    aligned[*dst] = value;
                }
            }
            rows.push(aligned);
        }
    }

    Table::from_parts(columns, rows)
}

/// Assembles per-chunk tables into the symbol's [`Dataset`].
pub fn assemble(
    tables: impl IntoIterator<Item = Table>,
    timestamp_column: &str,
) -> Result<Dataset, AssemblyError> {
    let joined = concat(tables);
    let timestamp_index = joined.column_index(timestamp_column);
    let (columns, rows) = joined.into_parts();
    let columns: Vec<String> = columns.into_iter().collect();

    if rows.is_empty() {
        return Ok(Dataset::new(columns, Vec::new()));
    }

    let ts_idx = timestamp_index.context(MissingTimestampColumnSnafu {
        column: timestamp_column,
        rows: rows.len(),
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for (row_idx, mut values) in rows.into_iter().enumerate() {
        let cell = &values[ts_idx];
        let timestamp = parse_timestamp(cell).with_context(|| TimestampSnafu {
            row: row_idx,
            column: timestamp_column,
            value: cell.to_string(),
        })?;
        values[ts_idx] = Value::String(canonical_timestamp(timestamp));
        records.push(BarRecord { timestamp, values });
    }

    // `sort_by_key` is stable: equal timestamps keep their concatenation order.
    records.sort_by_key(|record| record.timestamp);

    let before = records.len();
    let mut seen = HashSet::with_capacity(before);
    records.retain(|record| seen.insert(row_key(&record.values)));

    tracing::debug!(
        rows = records.len(),
        duplicates = before - records.len(),
        columns = columns.len(),
        "assembled dataset"
    );

    Ok(Dataset::new(columns, records))
}

/// Parses a timestamp cell.
///
/// Accepts RFC 3339 strings, naive `YYYY-MM-DD[T ]HH:MM:SS[.f]` strings
/// (taken as UTC) and integer epochs (seconds, or milliseconds above 10^12).
/// Epochs outside chrono's range are rejected.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_timestamp_str(text.trim()),
        Value::Number(number) => {
            let epoch = number.as_i64()?;
            if epoch.unsigned_abs() > 1_000_000_000_000 {
                Utc.timestamp_millis_opt(epoch).single()
            } else {
                Utc.timestamp_opt(epoch, 0).single()
            }
        }
        _ => None,
    }
}

fn parse_timestamp_str(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

/// Full-row identity. Cells are JSON-encoded so the separator can never
/// appear unescaped inside one.
fn row_key(values: &[Value]) -> String {
    let mut key = String::new();
    for value in values {
        key.push_str(&value.to_string());
        key.push('\u{1f}');
    }
    key
}
