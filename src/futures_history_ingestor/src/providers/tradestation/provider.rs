use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use snafu::ResultExt;

use crate::{
    auth::BearerToken,
    models::chunk::{ChunkRequest, RawChunk},
    providers::{
        ApiSnafu, ChunkSource, ClientBuildSnafu, InvalidAuthHeaderSnafu, InvalidEndpointSnafu,
        PayloadSnafu, ProviderError, ProviderInitError, ReqwestSnafu, SourceFactory,
    },
};

pub const MARKET_DATA_BASE_URL: &str = "https://api.tradestation.com/v3/marketdata/barcharts";

/// Bar-chart client bound to one symbol and one bearer token.
///
/// Holds its own connection pool; drop it to release the connections.
pub struct TradeStationProvider {
    client: Client,
    endpoint: String,
}

impl TradeStationProvider {
    /// Creates a provider for `symbol` under `base_url`.
    ///
    /// The token is installed as a sensitive default `Authorization` header.
    pub fn new(
        base_url: &str,
        symbol: &str,
        token: &BearerToken,
        timeout: Option<Duration>,
    ) -> Result<Self, ProviderInitError> {
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", token.expose()))
            .context(InvalidAuthHeaderSnafu)?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context(ClientBuildSnafu)?;

        let endpoint = bar_chart_url(base_url, symbol);
        client
            .get(&endpoint)
            .build()
            .context(InvalidEndpointSnafu { url: &endpoint })?;

        Ok(Self { client, endpoint })
    }
}

/// `{base_url}/{symbol}`, tolerating a trailing slash on the base.
pub fn bar_chart_url(base_url: &str, symbol: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), symbol)
}

/// Decodes a chunk response body.
pub fn parse_chunk(body: &[u8]) -> Result<RawChunk, ProviderError> {
    serde_json::from_slice(body).context(PayloadSnafu)
}

/// Opens one [`TradeStationProvider`] per symbol against a fixed base URL.
#[derive(Debug, Clone)]
pub struct TradeStationConnector {
    base_url: String,
    timeout: Option<Duration>,
}

impl TradeStationConnector {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }
}

impl SourceFactory for TradeStationConnector {
    type Source = TradeStationProvider;

    fn connect(
        &self,
        symbol: &str,
        token: &BearerToken,
    ) -> Result<TradeStationProvider, ProviderInitError> {
        TradeStationProvider::new(&self.base_url, symbol, token, self.timeout)
    }
}

#[async_trait]
impl ChunkSource for TradeStationProvider {
    async fn fetch_chunk(&self, request: &ChunkRequest) -> Result<RawChunk, ProviderError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&request.query_params())
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return ApiSnafu {
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        let body = response.bytes().await.context(ReqwestSnafu)?;
        let chunk = parse_chunk(&body)?;
        tracing::trace!(
            endpoint = %self.endpoint,
            start = %request.range.start(),
            end = %request.range.end(),
            bars = chunk.bars.as_ref().map_or(0, Vec::len),
            "chunk fetched"
        );
        Ok(chunk)
    }
}
