use serde::Serialize;

use papervest_core::{FetchPipeline, PerformanceSummary, SessionStore, TechnicalSnapshot};

use crate::cli::AnalyzeArgs;
use crate::error::CliError;

use super::CommandOutcome;

#[derive(Debug, Serialize)]
struct AnalyzeResponseData {
    performance: PerformanceSummary,
    technicals: TechnicalSnapshot,
}

pub async fn run(
    args: &AnalyzeArgs,
    pipeline: &FetchPipeline,
    session: &SessionStore,
) -> Result<CommandOutcome, CliError> {
    let request = super::build_request(&args.ticker, args.start.as_deref(), args.end.as_deref())?;
    let outcome = session.resolve(pipeline, &request).await?;

    let performance = PerformanceSummary::from_series(&outcome.series, args.amount)?;
    let technicals = TechnicalSnapshot::from_series(&outcome.series);

    let data = serde_json::to_value(AnalyzeResponseData {
        performance,
        technicals,
    })?;

    Ok(CommandOutcome::ok(data)
        .with_origin(outcome.origin)
        .with_latency(outcome.latency_ms)
        .with_warnings(outcome.warnings))
}
