use std::process::ExitCode;

use clap::Parser;
use futures_history_ingestor::{
    auth::{Credentials, RefreshTokenProvider},
    cli::{Cli, init_tracing, resolve_config},
    config::EnvSnafu,
    errors::IngestError,
    io::sink::CsvFileSink,
    pipeline::Ingestor,
    providers::tradestation::TradeStationConnector,
};
use snafu::ResultExt;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // A missing .env is fine; the variables may come from the environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let config = resolve_config(&cli).map_err(|source| IngestError::Config { source })?;
    let credentials = Credentials::from_env()
        .context(EnvSnafu)
        .map_err(|source| IngestError::Config { source })?;

    let mut identity_client = reqwest::Client::builder();
    if let Some(timeout) = config.request_timeout() {
        identity_client = identity_client.timeout(timeout);
    }
    let tokens = RefreshTokenProvider::new(
        identity_client.build()?,
        config.identity_url.clone(),
        credentials,
    );
    let sources = TradeStationConnector::new(config.market_data_url.clone(), config.request_timeout());
    let sink = CsvFileSink::new(
        config.output_dir.clone(),
        config.timeframe,
        config.start_year(),
        config.end_year(),
    );

    tracing::info!(
        symbols = config.symbols.len(),
        start = %config.start_date,
        end = %config.end_date,
        chunk_days = config.chunk_days,
        timeframe = %config.timeframe,
        output_dir = %config.output_dir.display(),
        "starting futures history download"
    );

    let summary = Ingestor::new(config, tokens, sources, sink).run().await?;
    println!("we've finished loading the data");

    for failure in &summary.failed {
        eprintln!("ERROR: {} - {}", failure.symbol, failure.error);
    }
    if !summary.is_success() {
        eprintln!(
            "SUMMARY: {} succeeded, {} failed",
            summary.succeeded.len(),
            summary.failed.len()
        );
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
