use crate::config::{ConfigError, IngestConfig};

use super::commands::Cli;

/// Splits a comma-separated symbol list, dropping blanks.
pub fn parse_symbols(symbols: &str) -> Vec<String> {
    symbols
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Loads the config file (or defaults) and applies command-line overrides.
pub fn resolve_config(cli: &Cli) -> Result<IngestConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => IngestConfig::load(path)?,
        None => IngestConfig::default(),
    };

    if let Some(symbols) = &cli.symbols {
        config.symbols = parse_symbols(symbols);
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }
    if cli.continue_on_error {
        config.continue_on_error = true;
    }

    config.validate()?;
    Ok(config)
}
