//! Column-aligned record set produced per chunk and consumed by assembly.

use indexmap::IndexSet;
use serde_json::Value;

use crate::models::dataset::Dataset;

/// Rows aligned to an ordered column list. Absent cells hold [`Value::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: IndexSet<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a table from column names and rows already aligned to them.
    ///
    /// Rows shorter than the column list are padded with nulls; longer rows
    /// are truncated.
    pub fn from_parts(columns: IndexSet<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &IndexSet<String> {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(name)
    }

    pub fn into_parts(self) -> (IndexSet<String>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }
}

impl From<&Dataset> for Table {
    fn from(dataset: &Dataset) -> Self {
        let columns = dataset.columns().iter().cloned().collect();
        let rows = dataset
            .records()
            .iter()
            .map(|record| record.values.clone())
            .collect();
        Self { columns, rows }
    }
}
