//! # Papervest Core
//!
//! Resilient market-data acquisition, normalization, and analysis for
//! the Papervest toolkit.
//!
//! ## Overview
//!
//! This crate provides the foundational components for Papervest:
//!
//! - **Validated domain models** for tickers, trading dates, and price series
//! - **A source contract** for upstream market-data adapters
//! - **A fetch pipeline** with retries, window escalation, and sample fallback
//! - **Wire decoding** for the chart API's column-oriented payloads
//! - **Session memory** so repeat requests never refetch
//! - **Analysis and quality reports** over normalized series
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Upstream adapters (chart API) |
//! | [`analysis`] | Performance summaries and technical indicators |
//! | [`decode`] | Wire payload decoding and normalization |
//! | [`domain`] | Domain models (Ticker, TradingDate, PriceSeries) |
//! | [`error`] | Validation error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`pipeline`] | The fetch ladder: range, windows, sample |
//! | [`profile`] | Company profiles and the sample catalog |
//! | [`provider`] | Source contract and fetch errors |
//! | [`quality`] | Data-quality grading |
//! | [`retry`] | Backoff and retry policies |
//! | [`sample`] | Deterministic sample series generation |
//! | [`session`] | Per-session fetch memory |
//! | [`throttle`] | Outbound request pacing |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use papervest_core::{ChartApiSource, FetchPipeline, FetchRange, TradingDate};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create the source and a pipeline with default policy
//!     let source = Arc::new(ChartApiSource::new("https://api.papervest.dev"));
//!     let pipeline = FetchPipeline::new(source);
//!
//!     // Fetch a year of AAPL history (end defaults to today)
//!     let start = TradingDate::parse("2025-01-02")?;
//!     let range = FetchRange::new(start, None)?;
//!     let outcome = pipeline.fetch_ticker("AAPL", range).await?;
//!
//!     println!(
//!         "{} rows from {} data in {}ms",
//!         outcome.series.len(),
//!         outcome.origin,
//!         outcome.latency_ms
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  CLI / Caller    │
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │  Session Store   │────▶│  Fetch Pipeline  │
//! │  (per ticker)    │     │  (the ladder)    │
//! └──────────────────┘     └────────┬─────────┘
//!                                   │
//!                                   ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ MarketDataSource │────▶│  HTTP Client     │
//! │ (chart adapter)  │     │  (reqwest/none)  │
//! └────────┬─────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │  Price Series    │
//! │  (validated)     │
//! └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Fetch failures carry a kind that drives the recovery ladder:
//!
//! ```rust
//! use papervest_core::{FetchError, FetchErrorKind};
//!
//! fn handle_error(error: FetchError) {
//!     match error.kind() {
//!         FetchErrorKind::RateLimited => {
//!             // Retried in place with backoff
//!         }
//!         FetchErrorKind::EmptyOrMalformedResponse => {
//!             // Escalates to a wider lookback window
//!         }
//!         FetchErrorKind::NetworkUnavailable => {
//!             // Sample fallback engages, if the policy allows
//!         }
//!         FetchErrorKind::InvalidTicker => {
//!             // Rejected before any network call
//!         }
//!     }
//! }
//! ```

pub mod adapters;
pub mod analysis;
pub mod decode;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod pipeline;
pub mod profile;
pub mod provider;
pub mod quality;
pub mod retry;
pub mod sample;
pub mod session;
pub mod throttle;

// Re-export commonly used types at crate root for convenience

// Adapter implementations
pub use adapters::ChartApiSource;

// Analysis reports
pub use analysis::{daily_returns, PerformanceSummary, TechnicalSnapshot};

// Wire decoding
pub use decode::{decode_history, DecodeError};

// Domain models
pub use domain::{weekdays_between, LookbackWindow, PriceRecord, PriceSeries, Ticker, TradingDate};

// Error types
pub use error::ValidationError;

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

// Fetch pipeline
pub use pipeline::{
    DataOrigin, FetchPipeline, FetchPolicy, FetchRange, FetchRequest, FetchResult, FetchSuccess,
    MIN_VIABLE_ROWS,
};

// Company profiles
pub use profile::{sample_profile, CompanyProfile};

// Source contract
pub use provider::{FetchError, FetchErrorKind, HistoryQuery, MarketDataSource, QuerySpan};

// Quality reports
pub use quality::{QualityGrade, QualityReport};

// Retry logic
pub use retry::{Backoff, RetryPolicy};

// Sample data
pub use sample::{sample_series, MIN_SAMPLE_DAYS};

// Session memory
pub use session::SessionStore;

// Request pacing
pub use throttle::RequestPacer;
