//! Turns one raw chunk response into a column-aligned [`Table`].

use indexmap::IndexSet;
use serde_json::Value;

use crate::models::{chunk::RawChunk, table::Table};

/// Converts the chunk's `Bars` list into rows.
///
/// Columns are the union of keys across all bar objects, in first-seen
/// order; a bar missing a key gets a null cell. A chunk without `Bars`
/// contributes an empty table.
pub fn normalize_chunk(chunk: RawChunk) -> Table {
    let Some(bars) = chunk.bars else {
        return Table::empty();
    };

    let mut columns = IndexSet::new();
    for bar in &bars {
        for key in bar.keys() {
            if !columns.contains(key) {
                columns.insert(key.clone());
            }
        }
    }

    let rows = bars
        .iter()
        .map(|bar| {
            columns
                .iter()
                .map(|column| bar.get(column).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Table::from_parts(columns, rows)
}
