pub mod commands;
pub mod params;

pub use commands::Cli;
pub use params::{parse_symbols, resolve_config};

use snafu::{ResultExt, Snafu};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Snafu)]
pub enum TracingInitError {
    #[snafu(display("invalid log filter `{filter}`: {source}"))]
    Filter {
        filter: String,
        source: tracing_subscriber::filter::ParseError,
    },

    #[snafu(display("failed to install tracing subscriber: {source}"))]
    Install {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Installs the global subscriber. `RUST_LOG` wins over `log_level`; output
/// goes to stderr so stdout only carries the per-symbol shape lines.
pub fn init_tracing(log_level: &str) -> Result<(), TracingInitError> {
    let env_filter = build_filter(std::env::var("RUST_LOG").ok(), log_level)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .context(InstallSnafu)
}

fn build_filter(from_env: Option<String>, log_level: &str) -> Result<EnvFilter, TracingInitError> {
    let filter = from_env.unwrap_or_else(|| log_level.to_string());
    EnvFilter::try_new(&filter).context(FilterSnafu { filter })
}
