use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Lookback windows used when the exact requested range cannot be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookbackWindow {
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "3mo")]
    ThreeMonths,
}

impl LookbackWindow {
    /// Escalation order: widest first, narrowing until something sticks.
    pub const FALLBACK: [Self; 5] = [
        Self::FiveYears,
        Self::TwoYears,
        Self::OneYear,
        Self::SixMonths,
        Self::ThreeMonths,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FiveYears => "5y",
            Self::TwoYears => "2y",
            Self::OneYear => "1y",
            Self::SixMonths => "6mo",
            Self::ThreeMonths => "3mo",
        }
    }
}

impl Display for LookbackWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookbackWindow {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "5y" => Ok(Self::FiveYears),
            "2y" => Ok(Self::TwoYears),
            "1y" => Ok(Self::OneYear),
            "6mo" => Ok(Self::SixMonths),
            "3mo" => Ok(Self::ThreeMonths),
            other => Err(ValidationError::InvalidWindow {
                value: other.to_owned(),
            }),
        }
    }
}
