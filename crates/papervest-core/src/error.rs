use thiserror::Error;

/// Validation and contract errors exposed by `papervest-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker contains invalid character '{ch}' at index {index}, expected ASCII letters")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },
    #[error("start date '{start}' must be before end date '{end}'")]
    InvalidDateRange { start: String, end: String },

    #[error("invalid lookback window '{value}', expected one of 5y, 2y, 1y, 6mo, 3mo")]
    InvalidWindow { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("field '{field}' must be positive")]
    NonPositiveValue { field: &'static str },

    #[error("record high must be >= low")]
    InvalidRecordRange,
    #[error("record open/close must be within high/low range")]
    InvalidRecordBounds,

    #[error("price series cannot be empty")]
    EmptySeries,
    #[error("price series has duplicate date '{date}'")]
    DuplicateDate { date: String },
    #[error("price series has {len} records, at least {min} required")]
    SeriesTooShort { len: usize, min: usize },
}
