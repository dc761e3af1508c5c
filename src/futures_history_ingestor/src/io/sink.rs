use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use snafu::{Backtrace, ResultExt, Snafu};

use crate::models::{dataset::Dataset, timeframe::TimeFrame};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// A file-system error (directory creation, open, flush).
    #[snafu(display("I/O error on {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The CSV encoder failed while writing rows.
    #[snafu(display("Failed to write CSV {}: {source}", path.display()))]
    Csv {
        path: PathBuf,
        source: csv::Error,
        backtrace: Backtrace,
    },
}

/// Destination for an assembled [`Dataset`].
pub trait DataSink {
    /// What a successful write produces, e.g. the path of the created file.
    type Output;

    fn write(&self, symbol: &str, dataset: &Dataset) -> Result<Self::Output, SinkError>;
}

/// `{symbol}_{tag}_data_{start_year}_{end_year}.csv`, e.g. `@ES_15m_data_2000_2024.csv`.
pub fn export_file_name(
    symbol: &str,
    timeframe: &TimeFrame,
    start_year: i32,
    end_year: i32,
) -> String {
    format!(
        "{symbol}_{}_data_{start_year}_{end_year}.csv",
        timeframe.file_tag()
    )
}

/// Writes one CSV per symbol into `output_dir`: header row, then one line
/// per record, no index column.
#[derive(Debug, Clone)]
pub struct CsvFileSink {
    output_dir: PathBuf,
    timeframe: TimeFrame,
    start_year: i32,
    end_year: i32,
}

impl CsvFileSink {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        timeframe: TimeFrame,
        start_year: i32,
        end_year: i32,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            timeframe,
            start_year,
            end_year,
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.output_dir.join(export_file_name(
            symbol,
            &self.timeframe,
            self.start_year,
            self.end_year,
        ))
    }
}

impl DataSink for CsvFileSink {
    type Output = PathBuf;

    fn write(&self, symbol: &str, dataset: &Dataset) -> Result<PathBuf, SinkError> {
        fs::create_dir_all(&self.output_dir).context(IoSnafu {
            path: &self.output_dir,
        })?;

        let path = self.path_for(symbol);
        write_csv(&path, dataset)?;
        tracing::debug!(symbol, path = %path.display(), rows = dataset.shape().0, "dataset exported");
        Ok(path)
    }
}

fn write_csv(path: &Path, dataset: &Dataset) -> Result<(), SinkError> {
    let mut writer = csv::Writer::from_path(path).context(CsvSnafu { path })?;

    if !dataset.columns().is_empty() {
        writer
            .write_record(dataset.columns())
            .context(CsvSnafu { path })?;
    }
    for record in dataset.records() {
        writer
            .write_record(record.values.iter().map(cell_bytes))
            .context(CsvSnafu { path })?;
    }

    writer.flush().context(IoSnafu { path })
}

/// Strings are written raw, nulls as empty cells, everything else as JSON.
fn cell_bytes(value: &Value) -> Cow<'_, [u8]> {
    match value {
        Value::Null => Cow::Borrowed(b""),
        Value::String(text) => Cow::Borrowed(text.as_bytes()),
        other => Cow::Owned(other.to_string().into_bytes()),
    }
}
