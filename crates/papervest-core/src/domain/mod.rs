//! # Domain Models
//!
//! Strongly-typed domain models for papervest market data.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | Validated stock ticker (1-5 ASCII letters, uppercase) |
//! | [`TradingDate`] | Calendar date with the canonical `YYYY-MM-DD` form |
//! | [`LookbackWindow`] | Fallback lookback windows (5y down to 3mo) |
//! | [`PriceRecord`] | One validated trading day (OHLCV + adjusted close) |
//! | [`PriceSeries`] | Chronological, duplicate-free series for one ticker |
//!
//! ## Validation
//!
//! All domain types enforce their invariants at construction time:
//!
//! ```rust
//! use papervest_core::{Ticker, ValidationError};
//!
//! let ticker = Ticker::parse("nvda").expect("valid ticker");
//! assert_eq!(ticker.as_str(), "NVDA");
//!
//! let err = Ticker::parse("appl!").expect_err("rejected before any fetch");
//! assert!(matches!(err, ValidationError::TickerInvalidChar { .. }));
//! ```

mod date;
mod series;
mod ticker;
mod window;

pub use date::{weekdays_between, TradingDate};
pub use series::{PriceRecord, PriceSeries};
pub use ticker::Ticker;
pub use window::LookbackWindow;
