//! One scheduled remote call and its untyped response.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::models::{date_range::DateRange, timeframe::TimeFrame};

/// A bar object as returned by the API: field names and value types are not
/// interpreted until assembly.
pub type RawBar = Map<String, Value>;

/// A [`DateRange`] plus the bar query parameters shared by every chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRequest {
    pub range: DateRange,
    pub timeframe: TimeFrame,
}

impl ChunkRequest {
    pub fn new(range: DateRange, timeframe: TimeFrame) -> Self {
        Self { range, timeframe }
    }

    /// Query string pairs for the bar-chart endpoint.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("unit", self.timeframe.unit.api_name().to_string()),
            ("interval", self.timeframe.amount.to_string()),
            ("firstdate", format_api_timestamp(self.range.start())),
            ("lastdate", format_api_timestamp(self.range.end())),
        ]
    }
}

/// `2000-01-01T00:00:00Z`, the form the API expects for `firstdate`/`lastdate`.
pub fn format_api_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Response body of one chunk request.
///
/// Only `Bars` is kept. A body without it is still a valid chunk: the range
/// simply had no data.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawChunk {
    #[serde(rename = "Bars", default)]
    pub bars: Option<Vec<RawBar>>,
}

impl RawChunk {
    pub fn with_bars(bars: Vec<RawBar>) -> Self {
        Self { bars: Some(bars) }
    }

    pub fn has_bars(&self) -> bool {
        self.bars.is_some()
    }
}
