use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the config file (futures_history.toml); built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Comma-separated list of symbols overriding the config (e.g. "@ES,@NQ")
    #[arg(long)]
    pub symbols: Option<String>,

    /// Directory the CSV files are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Keep going with the next symbol when one fails
    #[arg(long)]
    pub continue_on_error: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
