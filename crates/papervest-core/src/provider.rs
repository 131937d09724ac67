//! Market-data source contract and fetch error types.
//!
//! This module defines the adapter contract (`MarketDataSource`) that
//! every upstream implementation follows, the query types the pipeline
//! sends, and the structured error that classifies upstream failures.
//!
//! # Endpoints
//!
//! | Endpoint | Request | Response | Description |
//! |----------|---------|----------|-------------|
//! | History | [`HistoryQuery`] | [`PriceSeries`] | Daily OHLCV history |
//! | Profile | [`Ticker`] | [`CompanyProfile`] | Company metadata |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{CompanyProfile, LookbackWindow, PriceSeries, Ticker, TradingDate};

/// Classification of a failed fetch, driving the recovery ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Rejected before any network activity.
    InvalidTicker,
    /// Upstream throttled the request; retried in place with backoff.
    RateLimited,
    /// Upstream answered with nothing usable; escalates to the next
    /// lookback window instead of retrying the same query.
    EmptyOrMalformedResponse,
    /// Upstream unreachable; terminal only when sample fallback is off.
    NetworkUnavailable,
}

/// Structured fetch error: a kind, a human-readable message, and whether
/// repeating the same query (after a backoff delay) may succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    retryable: bool,
}

impl FetchError {
    pub fn invalid_ticker(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::InvalidTicker,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn empty_or_malformed(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::EmptyOrMalformedResponse,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::NetworkUnavailable,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::InvalidTicker => "fetch.invalid_ticker",
            FetchErrorKind::RateLimited => "fetch.rate_limited",
            FetchErrorKind::EmptyOrMalformedResponse => "fetch.empty_or_malformed",
            FetchErrorKind::NetworkUnavailable => "fetch.unavailable",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

/// What slice of history a single upstream call asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySpan {
    /// The exact date range the caller requested.
    Range {
        start: TradingDate,
        end: TradingDate,
    },
    /// A provider-side lookback window, used during escalation.
    Window(LookbackWindow),
}

impl Display for QuerySpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Range { start, end } => write!(f, "range {start}..{end}"),
            Self::Window(window) => write!(f, "window {window}"),
        }
    }
}

/// One history query against a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub ticker: Ticker,
    pub span: QuerySpan,
}

impl HistoryQuery {
    pub fn range(ticker: Ticker, start: TradingDate, end: TradingDate) -> Self {
        Self {
            ticker,
            span: QuerySpan::Range { start, end },
        }
    }

    pub fn window(ticker: Ticker, window: LookbackWindow) -> Self {
        Self {
            ticker,
            span: QuerySpan::Window(window),
        }
    }
}

/// Upstream market-data contract.
///
/// Implementations must map transport and payload conditions onto
/// [`FetchErrorKind`]: HTTP 429 and throttling messages become
/// `RateLimited`, unusable payloads become `EmptyOrMalformedResponse`,
/// connectivity failures become `NetworkUnavailable`. The recovery
/// ladder in the pipeline depends on that classification.
///
/// Async methods return boxed futures so the trait stays object-safe.
/// Implementations must be `Send + Sync`; the pipeline shares them
/// across tasks.
pub trait MarketDataSource: Send + Sync {
    /// Short identifier used in logs and fetch reports.
    fn id(&self) -> &'static str;

    /// Fetches daily history for one query span.
    fn history<'a>(
        &'a self,
        query: HistoryQuery,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, FetchError>> + Send + 'a>>;

    /// Fetches company metadata for a ticker.
    fn profile<'a>(
        &'a self,
        ticker: Ticker,
    ) -> Pin<Box<dyn Future<Output = Result<CompanyProfile, FetchError>> + Send + 'a>>;
}
