//! Decode step: raw tabular payloads into validated price series.
//!
//! Upstream history payloads are tables whose column headers come in two
//! shapes, sometimes mixed within one response:
//!
//! - flat names: `"Close"`, `"Volume"`
//! - two-level pairs: `["Close", "NVDA"]`, where the second element
//!   echoes the ticker
//!
//! Normalization maps both onto the canonical fields. A pair contributes
//! its **first** element as the metric name; the ticker echo is
//! discarded. Rows carrying neither a close nor an adjusted close are
//! dropped. Everything else wrong with a payload is a structured
//! [`DecodeError`], which sources report upstream as an
//! empty-or-malformed response.

use serde::Deserialize;
use thiserror::Error;

use crate::{PriceRecord, PriceSeries, Ticker, TradingDate, ValidationError};

/// Structured decode failure for one payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("payload has no '{name}' column")]
    MissingColumn { name: &'static str },
    #[error("row {row} has {found} cells, expected {expected}")]
    RowArity {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row} has an unparseable date cell")]
    BadDateCell { row: usize },
    #[error("no usable rows after normalization")]
    NoUsableRows,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, Deserialize)]
struct RawHistory {
    columns: Vec<RawHeader>,
    rows: Vec<Vec<RawCell>>,
}

/// One column header, flat or two-level.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawHeader {
    Flat(String),
    Pair(String, String),
}

impl RawHeader {
    fn metric(&self) -> &str {
        match self {
            Self::Flat(name) => name,
            Self::Pair(first, _ticker_echo) => first,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawCell {
    Null,
    Number(f64),
    Text(String),
}

impl RawCell {
    /// Numeric view of a cell. Numeric strings coerce; anything else,
    /// including NaN, reads as absent.
    fn as_number(&self) -> Option<f64> {
        let value = match self {
            Self::Null => return None,
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Date,
    Open,
    High,
    Low,
    Close,
    AdjustedClose,
    Volume,
}

fn canonical_field(name: &str) -> Option<Field> {
    let normalized = name.trim().to_ascii_lowercase().replace('_', " ");
    match normalized.as_str() {
        "date" => Some(Field::Date),
        "open" => Some(Field::Open),
        "high" => Some(Field::High),
        "low" => Some(Field::Low),
        "close" => Some(Field::Close),
        "adj close" | "adjclose" | "adjusted close" => Some(Field::AdjustedClose),
        "volume" => Some(Field::Volume),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct ColumnMap {
    date: Option<usize>,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
    adjusted_close: Option<usize>,
    volume: Option<usize>,
}

impl ColumnMap {
    fn slot(&mut self, field: Field) -> &mut Option<usize> {
        match field {
            Field::Date => &mut self.date,
            Field::Open => &mut self.open,
            Field::High => &mut self.high,
            Field::Low => &mut self.low,
            Field::Close => &mut self.close,
            Field::AdjustedClose => &mut self.adjusted_close,
            Field::Volume => &mut self.volume,
        }
    }
}

fn map_columns(columns: &[RawHeader]) -> ColumnMap {
    let mut map = ColumnMap::default();
    for (index, header) in columns.iter().enumerate() {
        let metric = header.metric();
        match canonical_field(metric) {
            Some(field) => {
                let slot = map.slot(field);
                if slot.is_some() {
                    log::warn!("ignoring duplicate column '{metric}' at index {index}");
                } else {
                    *slot = Some(index);
                }
            }
            None => log::warn!("ignoring unrecognized column '{metric}'"),
        }
    }
    map
}

/// Decode one history payload into a validated, chronological series.
pub fn decode_history(ticker: &Ticker, body: &str) -> Result<PriceSeries, DecodeError> {
    let raw: RawHistory = serde_json::from_str(body)?;
    decode_table(ticker, &raw)
}

fn decode_table(ticker: &Ticker, raw: &RawHistory) -> Result<PriceSeries, DecodeError> {
    let map = map_columns(&raw.columns);

    let date_index = map.date.ok_or(DecodeError::MissingColumn { name: "date" })?;
    if map.close.is_none() && map.adjusted_close.is_none() {
        return Err(DecodeError::MissingColumn { name: "close" });
    }

    let expected = raw.columns.len();
    let mut records = Vec::with_capacity(raw.rows.len());
    let mut dropped = 0usize;

    for (row_index, row) in raw.rows.iter().enumerate() {
        if row.len() != expected {
            return Err(DecodeError::RowArity {
                row: row_index,
                expected,
                found: row.len(),
            });
        }

        let date_cell = row[date_index]
            .as_text()
            .ok_or(DecodeError::BadDateCell { row: row_index })?;
        let date = TradingDate::parse(date_cell)
            .map_err(|_| DecodeError::BadDateCell { row: row_index })?;

        let number_at = |slot: Option<usize>| slot.and_then(|index| row[index].as_number());

        let adjusted_close = number_at(map.adjusted_close);
        let close = match number_at(map.close).or(adjusted_close) {
            Some(close) => close,
            None => {
                dropped += 1;
                continue;
            }
        };

        let volume = number_at(map.volume)
            .filter(|v| *v >= 0.0)
            .map(|v| v as u64);

        records.push(PriceRecord::new(
            date,
            number_at(map.open),
            number_at(map.high),
            number_at(map.low),
            close,
            adjusted_close,
            volume,
        )?);
    }

    if dropped > 0 {
        log::warn!(
            "dropped {dropped} row(s) without close or adjusted close for {ticker}"
        );
    }

    if records.is_empty() {
        return Err(DecodeError::NoUsableRows);
    }

    Ok(PriceSeries::new(ticker.clone(), records)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(symbol: &str) -> Ticker {
        Ticker::parse(symbol).expect("ticker should parse")
    }

    #[test]
    fn two_level_pairs_take_the_first_element() {
        let body = r#"{
            "columns": ["Date", ["Close", "NVDA"], ["Volume", "NVDA"]],
            "rows": [
                ["2024-03-01", 822.79, 47677600],
                ["2024-03-04", 852.37, 61561600]
            ]
        }"#;

        let series = decode_history(&ticker("NVDA"), body).expect("must decode");
        assert_eq!(series.len(), 2);
        let first = &series.records()[0];
        assert_eq!(first.close, 822.79);
        assert_eq!(first.volume, Some(47_677_600));
        assert_eq!(first.open, None);
        assert_eq!(first.high, None);
        assert_eq!(first.adjusted_close, None);
    }

    #[test]
    fn flat_headers_decode_all_fields() {
        let body = r#"{
            "columns": ["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"],
            "rows": [["2024-03-01", 100.0, 104.0, 99.0, 103.0, 102.5, 1200000]]
        }"#;

        let series = decode_history(&ticker("AAPL"), body).expect("must decode");
        let record = &series.records()[0];
        assert_eq!(record.open, Some(100.0));
        assert_eq!(record.adjusted_close, Some(102.5));
        assert_eq!(record.price(), 102.5);
    }

    #[test]
    fn header_matching_is_case_insensitive() {
        let body = r#"{
            "columns": ["DATE", "close", "Adj_Close"],
            "rows": [["2024-03-01", 10.0, 9.5]]
        }"#;

        let series = decode_history(&ticker("AAPL"), body).expect("must decode");
        assert_eq!(series.records()[0].adjusted_close, Some(9.5));
    }

    #[test]
    fn rows_without_any_close_are_dropped() {
        let body = r#"{
            "columns": ["Date", "Close", "Adj Close"],
            "rows": [
                ["2024-03-01", 10.0, 9.5],
                ["2024-03-04", null, null],
                ["2024-03-05", 11.0, null]
            ]
        }"#;

        let series = decode_history(&ticker("AAPL"), body).expect("must decode");
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn close_falls_back_to_adjusted_close() {
        let body = r#"{
            "columns": ["Date", "Adj Close"],
            "rows": [["2024-03-01", 9.5], ["2024-03-04", 9.8]]
        }"#;

        let series = decode_history(&ticker("AAPL"), body).expect("must decode");
        let record = &series.records()[0];
        assert_eq!(record.close, 9.5);
        assert_eq!(record.adjusted_close, Some(9.5));
    }

    #[test]
    fn numeric_strings_coerce() {
        let body = r#"{
            "columns": ["Date", "Close", "Volume"],
            "rows": [["2024-03-01", "103.25", "1200000"]]
        }"#;

        let series = decode_history(&ticker("AAPL"), body).expect("must decode");
        let record = &series.records()[0];
        assert_eq!(record.close, 103.25);
        assert_eq!(record.volume, Some(1_200_000));
    }

    #[test]
    fn missing_date_column_is_an_error() {
        let body = r#"{"columns": ["Close"], "rows": [[10.0]]}"#;
        let err = decode_history(&ticker("AAPL"), body).expect_err("must fail");
        assert!(matches!(err, DecodeError::MissingColumn { name: "date" }));
    }

    #[test]
    fn missing_price_columns_is_an_error() {
        let body = r#"{"columns": ["Date", "Volume"], "rows": [["2024-03-01", 100]]}"#;
        let err = decode_history(&ticker("AAPL"), body).expect_err("must fail");
        assert!(matches!(err, DecodeError::MissingColumn { name: "close" }));
    }

    #[test]
    fn all_rows_dropped_is_an_error() {
        let body = r#"{
            "columns": ["Date", "Close"],
            "rows": [["2024-03-01", null]]
        }"#;
        let err = decode_history(&ticker("AAPL"), body).expect_err("must fail");
        assert!(matches!(err, DecodeError::NoUsableRows));
    }

    #[test]
    fn non_json_payload_is_a_syntax_error() {
        let err = decode_history(&ticker("AAPL"), "<html>503</html>").expect_err("must fail");
        assert!(matches!(err, DecodeError::Syntax(_)));
    }

    #[test]
    fn duplicate_dates_surface_as_validation_failure() {
        let body = r#"{
            "columns": ["Date", "Close"],
            "rows": [["2024-03-01", 10.0], ["2024-03-01", 11.0]]
        }"#;
        let err = decode_history(&ticker("AAPL"), body).expect_err("must fail");
        assert!(matches!(
            err,
            DecodeError::Invalid(ValidationError::DuplicateDate { .. })
        ));
    }
}
