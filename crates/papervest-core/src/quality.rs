//! Data-quality assessment for a fetched series.
//!
//! The report grades how much history came back and how complete the
//! adjusted-close column is, and flags shapes that usually mean the
//! upstream feed is degraded.

use serde::Serialize;

use crate::domain::{PriceSeries, TradingDate};
use crate::pipeline::DataOrigin;

/// Coverage below this percentage earns a warning.
const COMPLETENESS_WARN_PCT: f64 = 80.0;

/// Coarse grade of a series, driven by row count and coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityGrade {
    /// Complete adjusted-close coverage over more than 100 rows.
    Full,
    /// More than 50 rows, possibly with gaps.
    Partial,
    /// Too little history for most indicators.
    Sparse,
}

impl QualityGrade {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
            Self::Sparse => "sparse",
        }
    }
}

impl std::fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality report for one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub data_points: usize,
    pub first_date: TradingDate,
    pub last_date: TradingDate,
    /// Percentage of rows carrying an adjusted close.
    pub completeness_pct: f64,
    pub origin: DataOrigin,
    pub grade: QualityGrade,
    pub warnings: Vec<String>,
}

impl QualityReport {
    pub fn for_series(series: &PriceSeries, origin: DataOrigin) -> Self {
        let data_points = series.len();
        let adjusted_rows = series
            .records()
            .iter()
            .filter(|record| record.adjusted_close.is_some())
            .count();
        let completeness_pct = adjusted_rows as f64 / data_points as f64 * 100.0;

        let grade = if completeness_pct == 100.0 && data_points > 100 {
            QualityGrade::Full
        } else if data_points > 50 {
            QualityGrade::Partial
        } else {
            QualityGrade::Sparse
        };

        let mut warnings = Vec::new();
        if completeness_pct < COMPLETENESS_WARN_PCT {
            warnings.push(format!(
                "only {completeness_pct:.1}% of rows carry an adjusted close"
            ));
        }

        let prices = series.prices();
        let flat = prices.iter().all(|price| *price == prices[0]);
        if flat && data_points > 1 {
            warnings.push(String::from(
                "prices show zero variance across the series",
            ));
        }

        Self {
            data_points,
            first_date: series.first_date(),
            last_date: series.last_date(),
            completeness_pct,
            origin,
            grade,
            warnings,
        }
    }
}
