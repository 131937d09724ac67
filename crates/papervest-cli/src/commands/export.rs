//! Export normalized history to CSV.

use std::fs::File;
use std::io::{BufWriter, Write};

use papervest_core::{FetchPipeline, PriceRecord, SessionStore};

use crate::cli::ExportArgs;
use crate::error::CliError;

use super::CommandOutcome;

pub async fn run(
    args: &ExportArgs,
    pipeline: &FetchPipeline,
    session: &SessionStore,
) -> Result<CommandOutcome, CliError> {
    let request = super::build_request(&args.ticker, args.start.as_deref(), args.end.as_deref())?;
    let outcome = session.resolve(pipeline, &request).await?;

    let rows_exported = write_csv(&args.output, outcome.series.records())?;

    let data = serde_json::json!({
        "ticker": outcome.series.ticker(),
        "output": args.output,
        "rows_exported": rows_exported,
        "exported": true,
    });

    Ok(CommandOutcome::ok(data)
        .with_origin(outcome.origin)
        .with_latency(outcome.latency_ms)
        .with_warnings(outcome.warnings))
}

fn write_csv(output_path: &str, records: &[PriceRecord]) -> Result<usize, CliError> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "date,open,high,low,close,adjusted_close,volume")?;
    for record in records {
        writeln!(
            writer,
            "{},{},{},{},{},{},{}",
            record.date,
            cell(record.open),
            cell(record.high),
            cell(record.low),
            record.close,
            cell(record.adjusted_close),
            record.volume.map(|v| v.to_string()).unwrap_or_default(),
        )?;
    }
    writer.flush()?;

    eprintln!("✓ exported {} rows to {}", records.len(), output_path);
    Ok(records.len())
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use papervest_core::TradingDate;

    fn record(date: &str, close: f64, adjusted: Option<f64>, volume: Option<u64>) -> PriceRecord {
        PriceRecord::new(
            TradingDate::parse(date).expect("date should parse"),
            None,
            None,
            None,
            close,
            adjusted,
            volume,
        )
        .expect("record should be valid")
    }

    #[test]
    fn csv_has_header_and_empty_cells_for_missing_values() {
        let dir = tempfile::tempdir().expect("tempdir should create");
        let path = dir.path().join("out.csv");
        let path_str = path.to_str().expect("path should be utf-8");

        let records = vec![
            record("2024-03-01", 100.5, Some(100.0), Some(1_000)),
            record("2024-03-04", 101.0, None, None),
        ];
        let rows = write_csv(path_str, &records).expect("write should succeed");
        assert_eq!(rows, 2);

        let contents = std::fs::read_to_string(&path).expect("file should read");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "date,open,high,low,close,adjusted_close,volume");
        assert_eq!(lines[1], "2024-03-01,,,,100.5,100,1000");
        assert_eq!(lines[2], "2024-03-04,,,,101,,");
    }

    #[test]
    fn csv_write_fails_cleanly_on_bad_paths() {
        let error = write_csv("/nonexistent-dir/out.csv", &[]).expect_err("must fail");
        assert!(matches!(error, CliError::Io(_)));
    }
}
