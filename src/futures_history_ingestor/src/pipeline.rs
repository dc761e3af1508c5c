//! Per-symbol orchestration: token, partition, fetch, assemble, export.
//!
//! Symbols are processed strictly one after another. Within a symbol every
//! chunk is requested concurrently and nothing is written until the whole
//! history has been assembled.

use snafu::ResultExt;
use tracing::Instrument;

use crate::{
    assembly::assemble,
    auth::TokenProvider,
    config::IngestConfig,
    errors::{AssemblySnafu, AuthSnafu, ExportSnafu, FetchSnafu, IngestError, PartitionSnafu},
    io::sink::DataSink,
    models::chunk::ChunkRequest,
    normalize::normalize_chunk,
    partition::partition,
    providers::{ChunkSource, InitSnafu as ProviderInitSnafu, SourceFactory},
    requests::historical::{build_requests, fetch_chunks},
};

/// Outcome of one successfully ingested symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolReport<O> {
    pub symbol: String,
    pub rows: usize,
    pub columns: usize,
    /// Number of chunk requests issued.
    pub chunks: usize,
    /// Chunks whose response had no `Bars` array.
    pub chunks_without_bars: usize,
    /// Whatever the sink produced, e.g. the CSV path.
    pub output: O,
}

#[derive(Debug)]
pub struct SymbolFailure {
    pub symbol: String,
    pub error: IngestError,
}

#[derive(Debug)]
pub struct RunSummary<O> {
    pub succeeded: Vec<SymbolReport<O>>,
    pub failed: Vec<SymbolFailure>,
}

impl<O> Default for RunSummary<O> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<O> RunSummary<O> {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fetches, normalizes, assembles and exports one symbol's history.
pub async fn ingest_symbol<S, K>(
    source: &S,
    symbol: &str,
    requests: &[ChunkRequest],
    timestamp_column: &str,
    sink: &K,
) -> Result<SymbolReport<K::Output>, IngestError>
where
    S: ChunkSource + ?Sized,
    K: DataSink + ?Sized,
{
    let chunks = fetch_chunks(source, requests)
        .await
        .context(FetchSnafu { symbol })?;
    let chunks_without_bars = chunks.iter().filter(|chunk| !chunk.has_bars()).count();
    tracing::debug!(
        chunks = chunks.len(),
        chunks_without_bars,
        "all chunks fetched"
    );

    let dataset = assemble(chunks.into_iter().map(normalize_chunk), timestamp_column)
        .context(AssemblySnafu { symbol })?;
    tracing::debug!(
        first = ?dataset.first_timestamp(),
        last = ?dataset.last_timestamp(),
        "history assembled"
    );
    let output = sink
        .write(symbol, &dataset)
        .context(ExportSnafu { symbol })?;

    let (rows, columns) = dataset.shape();
    Ok(SymbolReport {
        symbol: symbol.to_string(),
        rows,
        columns,
        chunks: requests.len(),
        chunks_without_bars,
        output,
    })
}

/// Drives a full run over the configured symbols.
pub struct Ingestor<T, F, K> {
    config: IngestConfig,
    tokens: T,
    sources: F,
    sink: K,
}

impl<T, F, K> Ingestor<T, F, K>
where
    T: TokenProvider,
    F: SourceFactory,
    K: DataSink,
{
    pub fn new(config: IngestConfig, tokens: T, sources: F, sink: K) -> Self {
        Self {
            config,
            tokens,
            sources,
            sink,
        }
    }

    /// Ingests every symbol in order.
    ///
    /// Without `continue_on_error` the first failing symbol ends the run and
    /// its error is returned; symbols after it are not attempted.
    pub async fn run(&self) -> Result<RunSummary<K::Output>, IngestError> {
        let mut summary = RunSummary::default();

        for symbol in &self.config.symbols {
            let span = tracing::info_span!("symbol", %symbol);
            match self.ingest(symbol).instrument(span).await {
                Ok(report) => {
                    tracing::info!(
                        symbol = %report.symbol,
                        rows = report.rows,
                        columns = report.columns,
                        chunks = report.chunks,
                        chunks_without_bars = report.chunks_without_bars,
                        "symbol ingested"
                    );
                    println!("{} shape: ({}, {})", report.symbol, report.rows, report.columns);
                    summary.succeeded.push(report);
                }
                Err(error) if self.config.continue_on_error => {
                    tracing::error!(%symbol, %error, "symbol failed, moving on");
                    summary.failed.push(SymbolFailure {
                        symbol: symbol.clone(),
                        error,
                    });
                }
                Err(error) => return Err(error),
            }
        }

        Ok(summary)
    }

    async fn ingest(&self, symbol: &str) -> Result<SymbolReport<K::Output>, IngestError> {
        let token = self
            .tokens
            .access_token()
            .await
            .context(AuthSnafu { symbol })?;

        let ranges = partition(self.config.start(), self.config.end(), self.config.chunk())
            .context(PartitionSnafu { symbol })?;
        let requests = build_requests(&ranges, self.config.timeframe);

        // Dropped at the end of this call, releasing the connection pool.
        let source = self
            .sources
            .connect(symbol, &token)
            .context(ProviderInitSnafu)
            .context(FetchSnafu { symbol })?;

        ingest_symbol(
            &source,
            symbol,
            &requests,
            &self.config.timestamp_column,
            &self.sink,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;

    use crate::{
        auth::{AuthError, BearerToken, MissingTokenSnafu, StaticToken},
        io::sink::SinkError,
        models::{
            chunk::{RawChunk, format_api_timestamp},
            dataset::Dataset,
        },
        providers::{InternalSnafu, ProviderError, ProviderInitError},
    };

    /// Every chunk returns one bar at its own start plus a bar shared by all
    /// chunks, so the shared one must be de-duplicated.
    struct ScriptedSource {
        fail: bool,
    }

    #[async_trait]
    impl ChunkSource for ScriptedSource {
        async fn fetch_chunk(&self, request: &ChunkRequest) -> Result<RawChunk, ProviderError> {
            if self.fail {
                return InternalSnafu { message: "scripted" }.fail();
            }
            let bars = [
                json!({ "TimeStamp": format_api_timestamp(request.range.start()), "Close": "1" }),
                json!({ "TimeStamp": "2000-06-01T14:00:00Z", "Close": "2" }),
            ];
            Ok(serde_json::from_value(json!({ "Bars": bars })).unwrap())
        }
    }

    struct ScriptedFactory {
        failing: HashSet<&'static str>,
    }

    impl SourceFactory for ScriptedFactory {
        type Source = ScriptedSource;

        fn connect(
            &self,
            symbol: &str,
            _token: &BearerToken,
        ) -> Result<ScriptedSource, ProviderInitError> {
            Ok(ScriptedSource {
                fail: self.failing.contains(symbol),
            })
        }
    }

    struct RejectingTokens;

    #[async_trait]
    impl TokenProvider for RejectingTokens {
        async fn access_token(&self) -> Result<BearerToken, AuthError> {
            MissingTokenSnafu.fail()
        }
    }

    #[derive(Default)]
    struct MemorySink {
        written: Mutex<Vec<(String, (usize, usize))>>,
    }

    impl MemorySink {
        fn symbols(&self) -> Vec<String> {
            self.written
                .lock()
                .unwrap()
                .iter()
                .map(|(symbol, _)| symbol.clone())
                .collect()
        }
    }

    impl DataSink for MemorySink {
        type Output = ();

        fn write(&self, symbol: &str, dataset: &Dataset) -> Result<(), SinkError> {
            self.written
                .lock()
                .unwrap()
                .push((symbol.to_string(), dataset.shape()));
            Ok(())
        }
    }

    fn config(symbols: &[&str], continue_on_error: bool) -> IngestConfig {
        IngestConfig {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            start_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2002, 1, 1).unwrap(),
            continue_on_error,
            ..IngestConfig::default()
        }
    }

    fn token() -> StaticToken {
        StaticToken(BearerToken::new("t".to_string()))
    }

    fn factory(failing: &[&'static str]) -> ScriptedFactory {
        ScriptedFactory {
            failing: failing.iter().copied().collect(),
        }
    }

    #[tokio::test]
    async fn ingest_symbol_reports_shape_and_empty_chunks() {
        struct PartlyEmpty;

        #[async_trait]
        impl ChunkSource for PartlyEmpty {
            async fn fetch_chunk(&self, request: &ChunkRequest) -> Result<RawChunk, ProviderError> {
                if request.range.start().format("%Y").to_string() == "2000" {
                    ScriptedSource { fail: false }.fetch_chunk(request).await
                } else {
                    Ok(RawChunk::default())
                }
            }
        }

        let config = config(&["@ES"], false);
        let ranges = partition(config.start(), config.end(), config.chunk()).unwrap();
        let requests = build_requests(&ranges, config.timeframe);
        let sink = MemorySink::default();

        let report = ingest_symbol(&PartlyEmpty, "@ES", &requests, "TimeStamp", &sink)
            .await
            .unwrap();

        // 2000-01-01 and 2000-12-31 chunks answer, 2001-12-31 has no bars.
        assert_eq!(report.chunks, 3);
        assert_eq!(report.chunks_without_bars, 1);
        assert_eq!((report.rows, report.columns), (3, 2));
        assert_eq!(sink.symbols(), vec!["@ES"]);
    }

    #[tokio::test]
    async fn run_processes_symbols_in_order() {
        let sink = MemorySink::default();
        let ingestor = Ingestor::new(config(&["@ES", "@NQ"], false), token(), factory(&[]), sink);

        let summary = ingestor.run().await.unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.succeeded.len(), 2);
        assert_eq!(summary.succeeded[0].symbol, "@ES");
        // Three chunk-start bars plus the shared one.
        assert_eq!((summary.succeeded[1].rows, summary.succeeded[1].columns), (4, 2));
        assert_eq!(ingestor.sink.symbols(), vec!["@ES", "@NQ"]);
    }

    #[tokio::test]
    async fn first_failure_stops_the_run_by_default() {
        let ingestor = Ingestor::new(
            config(&["@ES", "@NG", "@CL"], false),
            token(),
            factory(&["@NG"]),
            MemorySink::default(),
        );

        let err = ingestor.run().await.unwrap_err();

        assert!(matches!(err, IngestError::Fetch { ref symbol, .. } if symbol == "@NG"));
        assert_eq!(err.symbol(), Some("@NG"));
        assert_eq!(ingestor.sink.symbols(), vec!["@ES"]);
    }

    #[tokio::test]
    async fn continue_on_error_isolates_failures() {
        let ingestor = Ingestor::new(
            config(&["@ES", "@NG", "@CL"], true),
            token(),
            factory(&["@NG"]),
            MemorySink::default(),
        );

        let summary = ingestor.run().await.unwrap();

        assert!(!summary.is_success());
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].symbol, "@NG");
        assert_eq!(ingestor.sink.symbols(), vec!["@ES", "@CL"]);
    }

    #[tokio::test]
    async fn token_failure_is_attributed_to_the_symbol() {
        let ingestor = Ingestor::new(
            config(&["@GC"], false),
            RejectingTokens,
            factory(&[]),
            MemorySink::default(),
        );

        let err = ingestor.run().await.unwrap_err();
        assert!(matches!(err, IngestError::Auth { ref symbol, .. } if symbol == "@GC"));
        assert!(ingestor.sink.symbols().is_empty());
    }

    #[tokio::test]
    async fn zero_chunk_length_is_a_partition_error() {
        let mut config = config(&["@TY"], false);
        config.chunk_days = 0;
        let ingestor = Ingestor::new(config, token(), factory(&[]), MemorySink::default());

        let err = ingestor.run().await.unwrap_err();
        assert!(matches!(err, IngestError::Partition { .. }));
    }
}
