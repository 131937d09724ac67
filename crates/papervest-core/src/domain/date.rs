use std::fmt::{Display, Formatter};
use std::sync::OnceLock;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::{self, FormatItem};
use time::{Date, OffsetDateTime, Weekday};

use crate::ValidationError;

static DATE_FORMAT: OnceLock<Vec<FormatItem<'static>>> = OnceLock::new();

fn date_format() -> &'static [FormatItem<'static>] {
    DATE_FORMAT.get_or_init(|| {
        format_description::parse("[year]-[month]-[day]")
            .expect("date format description must parse")
    })
}

/// Calendar date in the canonical `YYYY-MM-DD` text form used across
/// wire payloads, URLs, and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradingDate(Date);

impl TradingDate {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let parsed =
            Date::parse(input.trim(), date_format()).map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })?;
        Ok(Self(parsed))
    }

    /// Today in UTC.
    pub fn today() -> Self {
        Self(OffsetDateTime::now_utc().date())
    }

    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub const fn into_inner(self) -> Date {
        self.0
    }

    /// Monday through Friday. Synthetic series only carry weekdays.
    pub fn is_weekday(self) -> bool {
        !matches!(self.0.weekday(), Weekday::Saturday | Weekday::Sunday)
    }

    pub fn next_day(self) -> Option<Self> {
        self.0.next_day().map(Self)
    }

    /// Shift by whole days, either direction. `None` when the result
    /// leaves the representable calendar range.
    pub fn shift_days(self, days: i64) -> Option<Self> {
        self.0.checked_add(time::Duration::days(days)).map(Self)
    }

    /// Whole days from `self` to `other`; negative when `other` is earlier.
    pub fn days_until(self, other: Self) -> i64 {
        (other.0 - self.0).whole_days()
    }

    pub fn format_iso(self) -> String {
        self.0
            .format(date_format())
            .expect("TradingDate must be ISO formattable")
    }
}

/// All weekdays in `[start, end]`, ascending. Empty when `start > end`.
pub fn weekdays_between(start: TradingDate, end: TradingDate) -> Vec<TradingDate> {
    let mut days = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        if cursor.is_weekday() {
            days.push(cursor);
        }
        match cursor.next_day() {
            Some(next) => cursor = next,
            None => break,
        }
    }
    days
}

impl Display for TradingDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_iso())
    }
}

impl Serialize for TradingDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_iso())
    }
}

impl<'de> Deserialize<'de> for TradingDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
