mod analyze;
mod export;
mod fetch;
mod profile;
mod quality;

use std::sync::Arc;

use serde_json::Value;

use papervest_core::{
    ChartApiSource, DataOrigin, FetchPipeline, FetchPolicy, FetchRange, FetchRequest,
    NoopHttpClient, SessionStore, Ticker, TradingDate,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::Report;

/// Default lookback when no start date is given.
const DEFAULT_LOOKBACK_DAYS: i64 = 365;

/// What one command hands back before it is wrapped into a [`Report`].
pub struct CommandOutcome {
    pub data: Value,
    pub warnings: Vec<String>,
    pub latency_ms: u64,
    pub origin: Option<DataOrigin>,
}

impl CommandOutcome {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            latency_ms: 0,
            origin: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_origin(mut self, origin: DataOrigin) -> Self {
        self.origin = Some(origin);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Report, CliError> {
    let pipeline = build_pipeline(cli);
    let session = SessionStore::new();

    let outcome = match &cli.command {
        Command::Fetch(args) => fetch::run(args, &pipeline, &session).await?,
        Command::Analyze(args) => analyze::run(args, &pipeline, &session).await?,
        Command::Profile(args) => profile::run(args, &pipeline).await?,
        Command::Quality(args) => quality::run(args, &pipeline, &session).await?,
        Command::Export(args) => export::run(args, &pipeline, &session).await?,
    };

    Ok(Report::new(session.id(), outcome))
}

fn build_pipeline(cli: &Cli) -> FetchPipeline {
    // Offline runs never reach a server, so pacing and backoff delays
    // would only slow the walk to the sample fallback.
    let mut policy = if cli.offline {
        log::info!("offline mode: live fetching disabled, sample data only");
        FetchPolicy::without_delays()
    } else {
        FetchPolicy::default()
    };
    if cli.no_sample_fallback {
        policy.sample_fallback = false;
    }

    let source = if cli.offline {
        ChartApiSource::with_http_client(&cli.api_url, Arc::new(NoopHttpClient))
    } else {
        ChartApiSource::new(&cli.api_url)
    }
    .with_timeout_ms(cli.timeout_ms);

    FetchPipeline::with_policy(Arc::new(source), policy)
}

/// Parses and validates the shared ticker/start/end argument trio.
/// Everything here fails before any network activity.
fn build_request(
    raw_ticker: &str,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<FetchRequest, CliError> {
    let ticker = Ticker::parse(raw_ticker)?;

    let start = match start {
        Some(raw) => TradingDate::parse(raw)?,
        None => default_start()?,
    };
    let end = end.map(TradingDate::parse).transpose()?;
    let range = FetchRange::new(start, end)?;

    Ok(FetchRequest::new(ticker, range))
}

fn default_start() -> Result<TradingDate, CliError> {
    TradingDate::today()
        .shift_days(-DEFAULT_LOOKBACK_DAYS)
        .ok_or_else(|| CliError::Command(String::from("default start date out of calendar range")))
}
