use snafu::Snafu;

use crate::{
    assembly::AssemblyError, auth::AuthError, config::ConfigError, io::sink::SinkError,
    partition::PartitionError, providers::ProviderError,
};

/// Failure of a whole run or of one symbol within it.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum IngestError {
    #[snafu(display("configuration error: {source}"))]
    Config { source: ConfigError },

    #[snafu(display("{symbol}: could not obtain an access token: {source}"))]
    Auth { symbol: String, source: AuthError },

    #[snafu(display("{symbol}: could not partition the history window: {source}"))]
    Partition {
        symbol: String,
        source: PartitionError,
    },

    #[snafu(display("{symbol}: chunk fetch failed: {source}"))]
    Fetch {
        symbol: String,
        source: ProviderError,
    },

    #[snafu(display("{symbol}: assembly failed: {source}"))]
    Assembly {
        symbol: String,
        source: AssemblyError,
    },

    #[snafu(display("{symbol}: export failed: {source}"))]
    Export { symbol: String, source: SinkError },
}

impl IngestError {
    /// The symbol being processed when the error occurred, if any.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Config { .. } => None,
            Self::Auth { symbol, .. }
            | Self::Partition { symbol, .. }
            | Self::Fetch { symbol, .. }
            | Self::Assembly { symbol, .. }
            | Self::Export { symbol, .. } => Some(symbol),
        }
    }
}
