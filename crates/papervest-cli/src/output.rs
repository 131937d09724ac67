//! Report envelope and rendering.
//!
//! Every command produces one [`Report`]: a metadata block naming the
//! session, when the report was generated, where the data came from,
//! and any warnings, plus a command-specific data payload.

use serde::Serialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use papervest_core::DataOrigin;

use crate::cli::OutputFormat;
use crate::commands::CommandOutcome;
use crate::error::CliError;

/// Metadata attached to every command report.
#[derive(Debug, Serialize)]
pub struct ReportMeta {
    pub session_id: Uuid,
    pub generated_at: String,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<DataOrigin>,
    pub warnings: Vec<String>,
}

/// The complete output of one command invocation.
#[derive(Debug, Serialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub data: Value,
}

impl Report {
    pub fn new(session_id: Uuid, outcome: CommandOutcome) -> Self {
        let generated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .expect("UTC timestamps must be RFC3339 formattable");

        Self {
            meta: ReportMeta {
                session_id,
                generated_at,
                latency_ms: outcome.latency_ms,
                origin: outcome.origin,
                warnings: outcome.warnings,
            },
            data: outcome.data,
        }
    }
}

pub fn render(report: &Report, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(report)?
            } else {
                serde_json::to_string(report)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => render_table(report)?,
    }

    Ok(())
}

fn render_table(report: &Report) -> Result<(), CliError> {
    println!("session     : {}", report.meta.session_id);
    println!("generated_at: {}", report.meta.generated_at);
    println!("latency_ms  : {}", report.meta.latency_ms);
    if let Some(origin) = report.meta.origin {
        println!("origin      : {origin}");
    }

    if !report.meta.warnings.is_empty() {
        println!("warnings:");
        for warning in &report.meta.warnings {
            println!("  - {warning}");
        }
    }

    println!("data:");
    let pretty_data = serde_json::to_string_pretty(&report.data)?;
    for line in pretty_data.lines() {
        println!("  {line}");
    }

    Ok(())
}
