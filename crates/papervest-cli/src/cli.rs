//! CLI argument definitions for Papervest.
//!
//! This module contains the command-line interface structure using Clap.
//! The CLI supports commands for fetching market history, analyzing
//! buy-and-hold performance, and exporting normalized series.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fetch` | Fetch daily price history for a ticker |
//! | `analyze` | Performance summary and technical indicators |
//! | `profile` | Company profile lookup |
//! | `quality` | Grade the fetched history |
//! | `export` | Write the fetched history to a CSV file |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as failures |
//! | `--api-url` | papervest API | Chart API base URL |
//! | `--timeout-ms` | `10000` | Per-request timeout in ms |
//! | `--offline` | `false` | Skip the network, serve sample data |
//! | `--no-sample-fallback` | `false` | Fail instead of serving sample data |
//!
//! # Examples
//!
//! ```bash
//! # Fetch a year of history
//! papervest fetch AAPL
//!
//! # Analyze a $5,000 position over a custom range
//! papervest analyze AAPL --start 2023-01-02 --amount 5000 --pretty
//!
//! # Export to CSV without ever serving synthetic rows
//! papervest export AAPL --output aapl.csv --no-sample-fallback
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Default chart API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.papervest.dev";

/// Papervest - resilient market-data fetch and analysis CLI
///
/// Fetch daily price history with automatic retry, lookback-window
/// escalation, and a deterministic sample fallback, then analyze or
/// export the normalized series.
#[derive(Debug, Parser)]
#[command(
    name = "papervest",
    author,
    version,
    about = "Resilient market-data fetch and analysis CLI",
    long_about = "Papervest fetches daily market history and keeps working when the upstream \
does not. Features include:\n\
\n\
  • Rate-limit retries with exponential backoff\n\
  • Lookback-window escalation when a range returns nothing\n\
  • Deterministic sample data as a last resort\n\
  • Buy-and-hold performance and technical indicators\n\
  • CSV export of normalized series\n\
\n\
Use 'papervest <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    ///
    /// - json: Single JSON object (default)
    /// - table: Line-oriented format for terminals
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings as failures (exit code 5).
    ///
    /// Useful for scripts that must not silently consume fallback or
    /// sample data.
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Chart API base URL.
    #[arg(long, global = true, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Per-request timeout budget in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Skip the network entirely and serve deterministic sample data.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    /// Fail with an error instead of serving sample data when live
    /// fetching is exhausted.
    #[arg(long, global = true, default_value_t = false)]
    pub no_sample_fallback: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object output.
    Json,
    /// Line-oriented format for terminal display.
    Table,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// 📈 Fetch daily price history for a ticker.
    ///
    /// Walks the full recovery ladder: the requested range, then wider
    /// lookback windows, then sample data.
    ///
    /// # Examples
    ///
    ///   papervest fetch AAPL
    ///   papervest fetch MSFT --start 2023-01-02 --end 2024-01-02
    ///   papervest fetch NVDA --limit 10 --pretty
    Fetch(FetchArgs),

    /// 💰 Analyze buy-and-hold performance and technical indicators.
    ///
    /// Invests a hypothetical amount at the first price of the range
    /// and reports returns, volatility, drawdown, moving averages,
    /// RSI, and Bollinger bands.
    ///
    /// # Examples
    ///
    ///   papervest analyze AAPL
    ///   papervest analyze TSLA --amount 25000 --start 2022-01-03
    Analyze(AnalyzeArgs),

    /// 🏢 Fetch a company profile.
    ///
    /// Falls back to the built-in catalog when the live endpoint is
    /// unavailable.
    ///
    /// # Examples
    ///
    ///   papervest profile AAPL
    ///   papervest profile GOOGL --pretty
    Profile(ProfileArgs),

    /// 🔍 Grade the quality of fetched history.
    ///
    /// Reports row count, adjusted-close coverage, and a coarse grade,
    /// with warnings for degraded shapes.
    ///
    /// # Examples
    ///
    ///   papervest quality AAPL
    ///   papervest quality SPY --start 2020-01-02
    Quality(QualityArgs),

    /// 📄 Export fetched history to a CSV file.
    ///
    /// Columns: date, open, high, low, close, adjusted_close, volume.
    /// Missing optional values become empty cells.
    ///
    /// # Examples
    ///
    ///   papervest export AAPL --output aapl.csv
    ///   papervest export QQQ --start 2024-01-02 --output qqq.csv
    Export(ExportArgs),
}

/// Arguments for the `fetch` command.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Ticker symbol (e.g., AAPL).
    pub ticker: String,

    /// Start date (YYYY-MM-DD). Defaults to one year ago.
    #[arg(long)]
    pub start: Option<String>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub end: Option<String>,

    /// Only include the most recent N rows in the output.
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Arguments for the `analyze` command.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Ticker symbol (e.g., AAPL).
    pub ticker: String,

    /// Start date (YYYY-MM-DD). Defaults to one year ago.
    #[arg(long)]
    pub start: Option<String>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub end: Option<String>,

    /// Hypothetical investment amount in dollars.
    #[arg(long, default_value_t = 10_000.0)]
    pub amount: f64,
}

/// Arguments for the `profile` command.
#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Ticker symbol (e.g., AAPL).
    pub ticker: String,
}

/// Arguments for the `quality` command.
#[derive(Debug, Args)]
pub struct QualityArgs {
    /// Ticker symbol (e.g., AAPL).
    pub ticker: String,

    /// Start date (YYYY-MM-DD). Defaults to one year ago.
    #[arg(long)]
    pub start: Option<String>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub end: Option<String>,
}

/// Arguments for the `export` command.
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Ticker symbol (e.g., AAPL).
    pub ticker: String,

    /// Start date (YYYY-MM-DD). Defaults to one year ago.
    #[arg(long)]
    pub start: Option<String>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub end: Option<String>,

    /// Destination CSV file path.
    #[arg(long)]
    pub output: String,
}
