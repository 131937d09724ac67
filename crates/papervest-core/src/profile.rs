//! Company profile model and the deterministic sample catalog.

use serde::{Deserialize, Serialize};

use crate::{Ticker, ValidationError};

/// Company metadata as served by the profile endpoint. Optionals stay
/// `None` when the upstream omits a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub ticker: Ticker,
    pub name: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub website: Option<String>,
    pub country: Option<String>,
    pub currency: Option<String>,
}

impl CompanyProfile {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ticker: Ticker,
        name: impl Into<String>,
        sector: Option<String>,
        industry: Option<String>,
        market_cap: Option<f64>,
        dividend_yield: Option<f64>,
        beta: Option<f64>,
        pe_ratio: Option<f64>,
        website: Option<String>,
        country: Option<String>,
        currency: Option<String>,
    ) -> Result<Self, ValidationError> {
        validate_optional_non_negative("market_cap", market_cap)?;
        validate_optional_non_negative("dividend_yield", dividend_yield)?;
        validate_optional_finite("beta", beta)?;
        validate_optional_finite("pe_ratio", pe_ratio)?;

        Ok(Self {
            ticker,
            name: name.into(),
            sector,
            industry,
            market_cap,
            dividend_yield,
            beta,
            pe_ratio,
            website,
            country,
            currency,
        })
    }
}

/// Offline profile for a ticker: a known-company table for the common
/// demo tickers, a generic placeholder for everything else.
pub fn sample_profile(ticker: &Ticker) -> CompanyProfile {
    let known = [
        ("AAPL", "Apple Inc.", "Technology", "Consumer Electronics", 3.0e12),
        ("MSFT", "Microsoft Corporation", "Technology", "Software", 2.5e12),
        ("GOOGL", "Alphabet Inc.", "Technology", "Internet Services", 1.8e12),
        ("AMZN", "Amazon.com Inc.", "Consumer Discretionary", "E-commerce", 1.6e12),
        ("TSLA", "Tesla Inc.", "Consumer Discretionary", "Electric Vehicles", 8.0e11),
        ("NVDA", "NVIDIA Corporation", "Technology", "Semiconductors", 1.2e12),
        ("META", "Meta Platforms Inc.", "Technology", "Social Media", 7.0e11),
        ("SPY", "SPDR S&P 500 ETF Trust", "Financial", "ETF", 4.0e11),
        ("QQQ", "Invesco QQQ Trust", "Financial", "ETF", 2.0e11),
    ];

    let entry = known.iter().find(|(symbol, ..)| *symbol == ticker.as_str());
    let (name, sector, industry, market_cap) = match entry {
        Some((_, name, sector, industry, market_cap)) => {
            ((*name).to_owned(), (*sector).to_owned(), (*industry).to_owned(), *market_cap)
        }
        None => (
            format!("{ticker} Corporation"),
            String::from("Unknown"),
            String::from("Unknown"),
            5.0e10,
        ),
    };

    CompanyProfile::new(
        ticker.clone(),
        name,
        Some(sector),
        Some(industry),
        Some(market_cap),
        None,
        None,
        None,
        None,
        Some(String::from("United States")),
        Some(String::from("USD")),
    )
    .expect("catalog entries are valid")
}

fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field });
        }
        if value < 0.0 {
            return Err(ValidationError::NegativeValue { field });
        }
    }
    Ok(())
}

fn validate_optional_finite(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field });
        }
    }
    Ok(())
}
