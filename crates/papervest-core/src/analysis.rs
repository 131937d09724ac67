//! Investment performance and technical indicators over a price series.
//!
//! Every calculation reads prices through [`PriceRecord::price`], so
//! adjusted closes are preferred consistently across the crate. Two
//! report types come out of this module:
//!
//! | Report | Needs | Contents |
//! |--------|-------|----------|
//! | [`PerformanceSummary`] | 2+ rows | returns, volatility, drawdown |
//! | [`TechnicalSnapshot`] | varies | moving averages, RSI, Bollinger bands |
//!
//! Indicators that need more history than the series holds come back as
//! `None` rather than failing the whole snapshot.

use serde::Serialize;

use crate::domain::{PriceRecord, PriceSeries, Ticker};
use crate::error::ValidationError;

/// Annualization factor for daily volatility.
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Hypothetical buy-and-hold outcome: invest a fixed amount at the
/// first price, value it at the last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub ticker: Ticker,
    pub initial_investment: f64,
    pub shares: f64,
    pub initial_price: f64,
    pub final_price: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub percent_return: f64,
    /// Compounded to a 365-day year over the observed span.
    pub annualized_return: f64,
    /// Sample standard deviation of daily returns, annualized, percent.
    pub volatility: f64,
    /// Worst peak-to-trough drop of the daily return path, percent
    /// (zero or negative).
    pub max_drawdown: f64,
    pub days_invested: usize,
}

impl PerformanceSummary {
    pub fn from_series(series: &PriceSeries, investment: f64) -> Result<Self, ValidationError> {
        if !investment.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                field: "investment",
            });
        }
        if investment <= 0.0 {
            return Err(ValidationError::NonPositiveValue {
                field: "investment",
            });
        }
        if series.len() < 2 {
            return Err(ValidationError::SeriesTooShort {
                len: series.len(),
                min: 2,
            });
        }

        let prices = series.prices();
        let initial_price = prices[0];
        let final_price = prices[prices.len() - 1];
        let shares = investment / initial_price;
        let final_value = shares * final_price;
        let total_return = final_value - investment;
        let percent_return = (final_value / investment - 1.0) * 100.0;

        let days_invested = series.len();
        let annualized_return =
            ((1.0 + percent_return / 100.0).powf(365.0 / days_invested as f64) - 1.0) * 100.0;

        let returns = daily_returns(&prices);
        let volatility = sample_std(&returns) * TRADING_DAYS_PER_YEAR.sqrt() * 100.0;
        let max_drawdown = max_drawdown(&returns) * 100.0;

        Ok(Self {
            ticker: series.ticker().clone(),
            initial_investment: investment,
            shares,
            initial_price,
            final_price,
            final_value,
            total_return,
            percent_return,
            annualized_return,
            volatility,
            max_drawdown,
            days_invested,
        })
    }
}

/// Latest technical readings. Any indicator whose lookback exceeds the
/// series length is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalSnapshot {
    pub ticker: Ticker,
    pub latest_price: f64,
    pub ma_20: Option<f64>,
    pub ma_50: Option<f64>,
    pub ma_200: Option<f64>,
    /// Latest price relative to each moving average, percent.
    pub price_vs_ma_20: Option<f64>,
    pub price_vs_ma_50: Option<f64>,
    pub price_vs_ma_200: Option<f64>,
    pub rsi_14: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub price_change_20d: Option<f64>,
    pub price_change_50d: Option<f64>,
    /// Latest volume against its 20-day average.
    pub volume_ratio: Option<f64>,
}

impl TechnicalSnapshot {
    pub fn from_series(series: &PriceSeries) -> Self {
        let prices = series.prices();
        let latest_price = prices[prices.len() - 1];

        let ma_20 = moving_average(&prices, 20);
        let ma_50 = moving_average(&prices, 50);
        let ma_200 = moving_average(&prices, 200);
        let (bollinger_upper, bollinger_lower) = match bollinger_bands(&prices) {
            Some((upper, lower)) => (Some(upper), Some(lower)),
            None => (None, None),
        };

        Self {
            ticker: series.ticker().clone(),
            latest_price,
            ma_20,
            ma_50,
            ma_200,
            price_vs_ma_20: ma_20.map(|ma| (latest_price / ma - 1.0) * 100.0),
            price_vs_ma_50: ma_50.map(|ma| (latest_price / ma - 1.0) * 100.0),
            price_vs_ma_200: ma_200.map(|ma| (latest_price / ma - 1.0) * 100.0),
            rsi_14: relative_strength_index(&prices),
            bollinger_upper,
            bollinger_lower,
            price_change_20d: trailing_change(&prices, 20),
            price_change_50d: trailing_change(&prices, 50),
            volume_ratio: volume_ratio(series.records()),
        }
    }
}

/// Day-over-day fractional returns; one element shorter than the input.
pub fn daily_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|pair| pair[1] / pair[0] - 1.0)
        .collect()
}

/// Sample standard deviation. Fewer than two observations have no
/// spread and report zero.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Deepest trough below the running peak of the compounded return
/// path, as a fraction (zero or negative).
fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0f64;
    let mut peak = 1.0f64;
    let mut deepest = 0.0f64;
    for daily in returns {
        cumulative *= 1.0 + daily;
        if cumulative > peak {
            peak = cumulative;
        }
        let drawdown = cumulative / peak - 1.0;
        if drawdown < deepest {
            deepest = drawdown;
        }
    }
    deepest
}

fn moving_average(prices: &[f64], period: usize) -> Option<f64> {
    if prices.len() < period {
        return None;
    }
    let window = &prices[prices.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// 14-period RSI over simple averages of gains and losses. A window
/// with no losses saturates at 100.
fn relative_strength_index(prices: &[f64]) -> Option<f64> {
    const PERIOD: usize = 14;
    if prices.len() < PERIOD + 1 {
        return None;
    }
    let deltas: Vec<f64> = prices.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let window = &deltas[deltas.len() - PERIOD..];

    let avg_gain = window.iter().filter(|delta| **delta > 0.0).sum::<f64>() / PERIOD as f64;
    let avg_loss = -window.iter().filter(|delta| **delta < 0.0).sum::<f64>() / PERIOD as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let relative_strength = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + relative_strength))
}

/// 20-period Bollinger bands: mean plus and minus two sample standard
/// deviations.
fn bollinger_bands(prices: &[f64]) -> Option<(f64, f64)> {
    const PERIOD: usize = 20;
    if prices.len() < PERIOD {
        return None;
    }
    let window = &prices[prices.len() - PERIOD..];
    let mean = window.iter().sum::<f64>() / PERIOD as f64;
    let spread = 2.0 * sample_std(window);
    Some((mean + spread, mean - spread))
}

/// Percent change of the latest price against the price `period` rows
/// earlier.
fn trailing_change(prices: &[f64], period: usize) -> Option<f64> {
    if prices.len() < period + 1 {
        return None;
    }
    let latest = prices[prices.len() - 1];
    let earlier = prices[prices.len() - 1 - period];
    Some((latest / earlier - 1.0) * 100.0)
}

fn volume_ratio(records: &[PriceRecord]) -> Option<f64> {
    const PERIOD: usize = 20;
    if records.len() < PERIOD {
        return None;
    }
    let window = &records[records.len() - PERIOD..];
    let mut total = 0.0f64;
    for record in window {
        total += record.volume? as f64;
    }
    let average = total / PERIOD as f64;
    let latest = window[window.len() - 1].volume? as f64;
    (average > 0.0).then(|| latest / average)
}
