//! Source abstraction for chunked bar history.
//!
//! [`ChunkSource`] is the seam between the concurrent fetcher and a concrete
//! vendor API. Each implementation receives its endpoint and authorization
//! when it is constructed; nothing is read from shared or global state.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use futures_history_ingestor::models::chunk::{ChunkRequest, RawChunk};
//! use futures_history_ingestor::providers::{ChunkSource, ProviderError};
//!
//! struct EmptySource;
//!
//! #[async_trait]
//! impl ChunkSource for EmptySource {
//!     async fn fetch_chunk(&self, _request: &ChunkRequest) -> Result<RawChunk, ProviderError> {
//!         Ok(RawChunk::default())
//!     }
//! }
//! ```

pub mod tradestation;

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::{
    auth::BearerToken,
    models::chunk::{ChunkRequest, RawChunk},
};

/// Fetches the raw payload for one [`ChunkRequest`].
///
/// Implementations must be callable concurrently through a shared reference.
#[async_trait]
pub trait ChunkSource: Send + Sync {
    async fn fetch_chunk(&self, request: &ChunkRequest) -> Result<RawChunk, ProviderError>;
}

/// Builds a fresh [`ChunkSource`] for one symbol.
///
/// The orchestrator connects once per symbol and drops the source when that
/// symbol's fetch phase is over.
pub trait SourceFactory: Send + Sync {
    type Source: ChunkSource;

    fn connect(&self, symbol: &str, token: &BearerToken) -> Result<Self::Source, ProviderInitError>;
}

/// Errors that can occur during the creation of a provider instance.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// Bearer token contains characters not allowed in a header.
    #[snafu(display("Invalid authorization header value: {source}"))]
    InvalidAuthHeader {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },

    /// Endpoint could not be turned into a URL.
    #[snafu(display("Invalid endpoint {url}: {source}"))]
    InvalidEndpoint {
        url: String,
        source: reqwest::Error,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `ChunkSource` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The API answered with a non-success status.
    #[snafu(display("API error ({status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The body was not the JSON shape a chunk response must have.
    #[snafu(display("Malformed chunk payload: {source}"))]
    Payload {
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// An internal error occurred while processing data within the provider.
    #[snafu(display("Internal provider error: {message}"))]
    Internal {
        message: String,
        backtrace: Backtrace,
    },

    /// An error during provider configuration or initialization.
    #[snafu(display("Provider initialization error: {source}"))]
    Init {
        #[snafu(backtrace)]
        source: ProviderInitError,
    },
}
