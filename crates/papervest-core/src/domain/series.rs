use serde::{Deserialize, Serialize};

use crate::{Ticker, TradingDate, ValidationError};

/// One trading day of OHLCV data. `close` is the only required price;
/// upstream tables routinely omit the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: TradingDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub adjusted_close: Option<f64>,
    pub volume: Option<u64>,
}

impl PriceRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: TradingDate,
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
        close: f64,
        adjusted_close: Option<f64>,
        volume: Option<u64>,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("close", close)?;
        validate_optional_non_negative("open", open)?;
        validate_optional_non_negative("high", high)?;
        validate_optional_non_negative("low", low)?;
        validate_optional_non_negative("adjusted_close", adjusted_close)?;

        if let (Some(high), Some(low)) = (high, low) {
            if high < low {
                return Err(ValidationError::InvalidRecordRange);
            }
        }

        for price in [Some(close), open].into_iter().flatten() {
            if let Some(high) = high {
                if price > high {
                    return Err(ValidationError::InvalidRecordBounds);
                }
            }
            if let Some(low) = low {
                if price < low {
                    return Err(ValidationError::InvalidRecordBounds);
                }
            }
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            adjusted_close,
            volume,
        })
    }

    /// The resolved price for this day: adjusted close when present,
    /// raw close otherwise. Every consumer (returns, indicators, quality,
    /// export) reads prices through this one method.
    pub fn price(&self) -> f64 {
        self.adjusted_close.unwrap_or(self.close)
    }
}

/// Ordered daily series for one ticker. Dates are strictly increasing;
/// construction sorts its input and rejects duplicates, so any held
/// series is already chronological.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: Ticker,
    records: Vec<PriceRecord>,
}

impl PriceSeries {
    pub fn new(ticker: Ticker, mut records: Vec<PriceRecord>) -> Result<Self, ValidationError> {
        if records.is_empty() {
            return Err(ValidationError::EmptySeries);
        }

        records.sort_by(|a, b| a.date.cmp(&b.date));
        for pair in records.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(ValidationError::DuplicateDate {
                    date: pair[0].date.format_iso(),
                });
            }
        }

        Ok(Self { ticker, records })
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> TradingDate {
        self.records[0].date
    }

    pub fn last_date(&self) -> TradingDate {
        self.records[self.records.len() - 1].date
    }

    /// Resolved prices in date order, via [`PriceRecord::price`].
    pub fn prices(&self) -> Vec<f64> {
        self.records.iter().map(PriceRecord::price).collect()
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_non_negative(field, value)?;
    }
    Ok(())
}
