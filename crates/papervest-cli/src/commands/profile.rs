use serde::Serialize;

use papervest_core::{CompanyProfile, DataOrigin, FetchPipeline, Ticker};

use crate::cli::ProfileArgs;
use crate::error::CliError;

use super::CommandOutcome;

#[derive(Debug, Serialize)]
struct ProfileResponseData {
    profile: CompanyProfile,
}

pub async fn run(args: &ProfileArgs, pipeline: &FetchPipeline) -> Result<CommandOutcome, CliError> {
    let ticker = Ticker::parse(&args.ticker)?;
    let (profile, origin) = pipeline.profile(&ticker).await?;

    let data = serde_json::to_value(ProfileResponseData { profile })?;
    let mut outcome = CommandOutcome::ok(data).with_origin(origin);
    if origin == DataOrigin::Sample {
        outcome = outcome.with_warning("live profile unavailable; serving catalog entry");
    }

    Ok(outcome)
}
