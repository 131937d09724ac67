use serde::Serialize;

use papervest_core::{
    DataOrigin, FetchPipeline, LookbackWindow, PriceRecord, SessionStore, Ticker, TradingDate,
};

use crate::cli::FetchArgs;
use crate::error::CliError;

use super::CommandOutcome;

#[derive(Debug, Serialize)]
struct FetchResponseData<'a> {
    ticker: &'a Ticker,
    origin: DataOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    served_window: Option<LookbackWindow>,
    rows: usize,
    first_date: TradingDate,
    last_date: TradingDate,
    latest_price: f64,
    records: &'a [PriceRecord],
}

pub async fn run(
    args: &FetchArgs,
    pipeline: &FetchPipeline,
    session: &SessionStore,
) -> Result<CommandOutcome, CliError> {
    let request = super::build_request(&args.ticker, args.start.as_deref(), args.end.as_deref())?;
    let outcome = session.resolve(pipeline, &request).await?;

    let series = &outcome.series;
    let records = match args.limit {
        Some(limit) => &series.records()[series.len().saturating_sub(limit)..],
        None => series.records(),
    };
    let latest_price = series.records()[series.len() - 1].price();

    let data = serde_json::to_value(FetchResponseData {
        ticker: series.ticker(),
        origin: outcome.origin,
        served_window: outcome.served_window,
        rows: series.len(),
        first_date: series.first_date(),
        last_date: series.last_date(),
        latest_price,
        records,
    })?;

    Ok(CommandOutcome::ok(data)
        .with_origin(outcome.origin)
        .with_latency(outcome.latency_ms)
        .with_warnings(outcome.warnings))
}
