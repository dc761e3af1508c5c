//! Run configuration: endpoints, symbol list, history window and output.
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! reproduces the stock run: eight futures roots, 2000-01-01 to 2024-08-29,
//! 365-day chunks of 15-minute bars. Secrets are never read from this file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use shared_utils::env::MissingEnvVarError;
use snafu::{ResultExt, Snafu, ensure};

use crate::{
    auth::IDENTITY_URL,
    models::timeframe::{TimeFrame, TimeFrameError},
    providers::tradestation::MARKET_DATA_BASE_URL,
};

pub const DEFAULT_SYMBOLS: [&str; 8] = ["@ES", "@NG", "@CL", "@GC", "@NQ", "@RTY", "@US", "@TY"];

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    #[snafu(display("{source}"))]
    File {
        source: shared_utils::config::ConfigError,
    },

    #[snafu(display("Failed to parse config: {source}"))]
    Toml { source: toml::de::Error },

    #[snafu(display("{source}"))]
    Env { source: MissingEnvVarError },

    #[snafu(display("Invalid timeframe: {source}"))]
    Timeframe { source: TimeFrameError },

    #[snafu(display("Invalid config: {message}"))]
    Invalid { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// OAuth token endpoint.
    pub identity_url: String,
    /// Bar-chart base URL; the symbol is appended as the last path segment.
    pub market_data_url: String,
    /// Processed in order, one at a time.
    pub symbols: Vec<String>,
    /// First day of history (UTC midnight), inclusive.
    pub start_date: NaiveDate,
    /// Last boundary (UTC midnight), exclusive.
    pub end_date: NaiveDate,
    pub chunk_days: u32,
    pub timeframe: TimeFrame,
    /// Name of the bar field holding the bar time.
    pub timestamp_column: String,
    pub output_dir: PathBuf,
    /// Keep going with the next symbol after a failure instead of stopping.
    pub continue_on_error: bool,
    /// Per-request timeout. Unset means requests may wait indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            identity_url: IDENTITY_URL.to_string(),
            market_data_url: MARKET_DATA_BASE_URL.to_string(),
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            start_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 8, 29).unwrap_or_default(),
            chunk_days: 365,
            timeframe: TimeFrame::default(),
            timestamp_column: "TimeStamp".to_string(),
            output_dir: PathBuf::from("."),
            continue_on_error: false,
            request_timeout_secs: None,
        }
    }
}

impl IngestConfig {
    /// Loads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = shared_utils::config::load_toml_file(path).context(FileSnafu)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).context(TomlSnafu)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(
            !self.symbols.is_empty(),
            InvalidSnafu {
                message: "symbols must not be empty"
            }
        );
        if let Some(blank) = self.symbols.iter().position(|s| s.trim().is_empty()) {
            return InvalidSnafu {
                message: format!("symbol #{blank} is blank"),
            }
            .fail();
        }
        ensure!(
            self.chunk_days > 0,
            InvalidSnafu {
                message: "chunk_days must be positive"
            }
        );
        ensure!(
            !self.timestamp_column.trim().is_empty(),
            InvalidSnafu {
                message: "timestamp_column must not be empty"
            }
        );
        TimeFrame::validate(self.timeframe.amount, self.timeframe.unit).context(TimeframeSnafu)?;
        Ok(())
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start_date.and_time(NaiveTime::MIN).and_utc()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end_date.and_time(NaiveTime::MIN).and_utc()
    }

    pub fn chunk(&self) -> TimeDelta {
        TimeDelta::days(i64::from(self.chunk_days))
    }

    pub fn start_year(&self) -> i32 {
        self.start_date.year()
    }

    pub fn end_year(&self) -> i32 {
        self.end_date.year()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timeframe::TimeFrameUnit;

    #[test]
    fn empty_document_gives_reference_run() {
        let config = IngestConfig::from_toml_str("").unwrap();

        assert_eq!(config, IngestConfig::default());
        assert_eq!(config.symbols.len(), 8);
        assert_eq!(config.symbols[0], "@ES");
        assert_eq!(config.start().to_rfc3339(), "2000-01-01T00:00:00+00:00");
        assert_eq!(config.end().to_rfc3339(), "2024-08-29T00:00:00+00:00");
        assert_eq!(config.chunk(), TimeDelta::days(365));
        assert_eq!((config.start_year(), config.end_year()), (2000, 2024));
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn overrides_are_applied() {
        let config = IngestConfig::from_toml_str(
            r#"
symbols = ["@ES", "@NQ"]
start_date = "2010-01-01"
end_date = "2012-06-30"
chunk_days = 90
output_dir = "data"
continue_on_error = true
request_timeout_secs = 30

[timeframe]
amount = 1
unit = "Daily"
"#,
        )
        .unwrap();

        assert_eq!(config.symbols, vec!["@ES", "@NQ"]);
        assert_eq!(config.chunk_days, 90);
        assert_eq!(config.timeframe.unit, TimeFrameUnit::Daily);
        assert_eq!(config.output_dir, PathBuf::from("data"));
        assert!(config.continue_on_error);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn bundled_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../configs/futures_history.toml");
        assert_eq!(IngestConfig::load(path).unwrap(), IngestConfig::default());
    }

    #[test]
    fn invalid_documents_are_rejected() {
        assert!(matches!(
            IngestConfig::from_toml_str("symbols = []"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            IngestConfig::from_toml_str("symbols = [\"@ES\", \" \"]"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            IngestConfig::from_toml_str("chunk_days = 0"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            IngestConfig::from_toml_str("[timeframe]\namount = 0\nunit = \"Minute\""),
            Err(ConfigError::Timeframe { .. })
        ));
        assert!(matches!(
            IngestConfig::from_toml_str("unknown_key = 1"),
            Err(ConfigError::Toml { .. })
        ));
    }
}
