use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_TICKER_LEN: usize = 5;

/// Normalized stock ticker: 1 to 5 ASCII letters, uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Parse and normalize a ticker to uppercase.
    ///
    /// Rejection happens here, before any network activity: anything
    /// longer than 5 characters or containing a non-letter never reaches
    /// a provider.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTicker);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_TICKER_LEN {
            return Err(ValidationError::TickerTooLong {
                len,
                max: MAX_TICKER_LEN,
            });
        }

        for (index, ch) in normalized.chars().enumerate() {
            if !ch.is_ascii_alphabetic() {
                return Err(ValidationError::TickerInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stable seed derived from the ticker text. Drives deterministic
    /// sample generation: same ticker, same seed, same series.
    pub fn seed(&self) -> u64 {
        self.0
            .bytes()
            .fold(0u64, |acc, byte| acc.wrapping_mul(33).wrapping_add(u64::from(byte)))
    }
}

impl Display for Ticker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Ticker {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Ticker {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_ticker() {
        let parsed = Ticker::parse(" nvda ").expect("ticker should parse");
        assert_eq!(parsed.as_str(), "NVDA");
    }

    #[test]
    fn rejects_empty_ticker() {
        let err = Ticker::parse("   ").expect_err("must fail");
        assert!(matches!(err, ValidationError::EmptyTicker));
    }

    #[test]
    fn rejects_too_long_ticker() {
        let err = Ticker::parse("ABCDEF").expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::TickerTooLong { len: 6, max: 5 }
        ));
    }

    #[test]
    fn rejects_non_letter_characters() {
        let err = Ticker::parse("appl!").expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::TickerInvalidChar { ch: '!', index: 4 }
        ));
    }

    #[test]
    fn seed_is_stable_per_ticker() {
        let a = Ticker::parse("ZZZZ").expect("ticker should parse");
        let b = Ticker::parse("zzzz").expect("ticker should parse");
        assert_eq!(a.seed(), b.seed());
        let other = Ticker::parse("AAPL").expect("ticker should parse");
        assert_ne!(a.seed(), other.seed());
    }
}
