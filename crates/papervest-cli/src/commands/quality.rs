use papervest_core::{FetchPipeline, QualityReport, SessionStore};

use crate::cli::QualityArgs;
use crate::error::CliError;

use super::CommandOutcome;

pub async fn run(
    args: &QualityArgs,
    pipeline: &FetchPipeline,
    session: &SessionStore,
) -> Result<CommandOutcome, CliError> {
    let request = super::build_request(&args.ticker, args.start.as_deref(), args.end.as_deref())?;
    let outcome = session.resolve(pipeline, &request).await?;

    let report = QualityReport::for_series(&outcome.series, outcome.origin);
    let data = serde_json::to_value(&report)?;

    Ok(CommandOutcome::ok(data)
        .with_origin(outcome.origin)
        .with_latency(outcome.latency_ms)
        .with_warnings(outcome.warnings))
}
