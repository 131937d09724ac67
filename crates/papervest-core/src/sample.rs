//! Deterministic sample series for offline and degraded operation.
//!
//! When every live strategy fails, the pipeline serves synthetic data
//! instead of an error. Generation is seeded from the ticker text, so
//! the same ticker over the same range always produces the same series,
//! run after run.

use crate::domain::weekdays_between;
use crate::{PriceRecord, PriceSeries, Ticker, TradingDate, ValidationError};

/// Fewest weekdays a synthetic series will carry. Matches the fetch
/// validation gate, so a generated series always passes it.
pub const MIN_SAMPLE_DAYS: usize = 2;

/// Anchor price for the random walk. Well-known tickers get plausible
/// levels, everything else starts at 100.
fn base_price(ticker: &Ticker) -> f64 {
    match ticker.as_str() {
        "AAPL" => 150.0,
        "MSFT" => 300.0,
        "GOOGL" => 2500.0,
        "AMZN" => 3000.0,
        "TSLA" => 800.0,
        "NVDA" => 400.0,
        "META" => 250.0,
        "NFLX" => 400.0,
        "SPY" => 400.0,
        "QQQ" => 350.0,
        _ => 100.0,
    }
}

fn uniform(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}

/// Generate a synthetic daily series over the weekdays of `[start, end]`.
///
/// The walk applies a small upward drift with uniform noise of +/- 2%
/// per day; per-day open/high/low wrap the walk price and are clamped so
/// `high` and `low` always bound `open` and `close`. Volume lands in the
/// 1M..10M range. `adjusted_close` equals `close`.
pub fn sample_series(
    ticker: &Ticker,
    start: TradingDate,
    end: TradingDate,
) -> Result<PriceSeries, ValidationError> {
    let days = weekdays_between(start, end);
    if days.len() < MIN_SAMPLE_DAYS {
        return Err(ValidationError::SeriesTooShort {
            len: days.len(),
            min: MIN_SAMPLE_DAYS,
        });
    }

    let mut rng = fastrand::Rng::with_seed(ticker.seed());
    let mut price = base_price(ticker);
    let mut records = Vec::with_capacity(days.len());

    for date in days {
        let daily_return = 0.001 + uniform(&mut rng, -0.02, 0.02);
        price *= 1.0 + daily_return;

        let open = price * uniform(&mut rng, 0.99, 1.01);
        let high_draw = price * uniform(&mut rng, 1.00, 1.03);
        let low_draw = price * uniform(&mut rng, 0.97, 1.00);
        let close = price;

        let high = high_draw.max(open).max(close);
        let low = low_draw.min(open).min(close);
        let volume = rng.u64(1_000_000..=10_000_000);

        records.push(PriceRecord::new(
            date,
            Some(open),
            Some(high),
            Some(low),
            close,
            Some(close),
            Some(volume),
        )?);
    }

    PriceSeries::new(ticker.clone(), records)
}

#[cfg(test)]
mod tests {
    use time::{Date, Month};

    use super::*;

    fn ticker(symbol: &str) -> Ticker {
        Ticker::parse(symbol).expect("ticker should parse")
    }

    fn date(year: i32, month: Month, day: u8) -> TradingDate {
        TradingDate::from_date(
            Date::from_calendar_date(year, month, day).expect("date should be valid"),
        )
    }

    #[test]
    fn generation_is_deterministic_per_ticker() {
        let start = date(2024, Month::January, 1);
        let end = date(2024, Month::March, 29);

        let first = sample_series(&ticker("ZZZZ"), start, end).expect("must generate");
        let second = sample_series(&ticker("ZZZZ"), start, end).expect("must generate");
        assert_eq!(first, second);

        let other = sample_series(&ticker("AAPL"), start, end).expect("must generate");
        assert_ne!(first.prices(), other.prices());
    }

    #[test]
    fn covers_weekdays_only_within_the_range() {
        let start = date(2024, Month::March, 1);
        let end = date(2024, Month::March, 31);
        let series = sample_series(&ticker("MSFT"), start, end).expect("must generate");

        assert!(series.records().iter().all(|record| record.date.is_weekday()));
        assert!(series.first_date() >= start);
        assert!(series.last_date() <= end);
        // March 2024 had 21 weekdays.
        assert_eq!(series.len(), 21);
    }

    #[test]
    fn walk_starts_near_the_catalog_anchor() {
        let start = date(2024, Month::March, 4);
        let end = date(2024, Month::March, 8);
        let series = sample_series(&ticker("AAPL"), start, end).expect("must generate");

        let first_close = series.records()[0].close;
        assert!(first_close > 150.0 * 0.95 && first_close < 150.0 * 1.05);
    }

    #[test]
    fn volume_lands_in_the_expected_band() {
        let start = date(2024, Month::January, 1);
        let end = date(2024, Month::January, 31);
        let series = sample_series(&ticker("SPY"), start, end).expect("must generate");

        for record in series.records() {
            let volume = record.volume.expect("sample records carry volume");
            assert!((1_000_000..=10_000_000).contains(&volume));
        }
    }

    #[test]
    fn refuses_a_span_with_too_few_weekdays() {
        // A single Saturday.
        let start = date(2024, Month::March, 16);
        let err = sample_series(&ticker("AAPL"), start, start).expect_err("must fail");
        assert!(matches!(err, ValidationError::SeriesTooShort { len: 0, min: 2 }));
    }
}
