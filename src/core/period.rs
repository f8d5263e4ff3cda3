//! Bucketing granularities and the calendar keys entries are grouped by.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Day, Period::Week, Period::Month, Period::Year];

    /// Maps a date onto the bucket it belongs to for this granularity.
    pub fn bucket(&self, date: NaiveDate) -> BucketKey {
        match self {
            Period::Day => BucketKey::Day(date),
            Period::Week => BucketKey::Week {
                year: date.year(),
                week: week_of_year(date),
            },
            Period::Month => BucketKey::Month {
                year: date.year(),
                month: date.month(),
            },
            Period::Year => BucketKey::Year(date.year()),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Period::Day => "day",
                Period::Week => "week",
                Period::Month => "month",
                Period::Year => "year",
            }
        )
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "d" => Ok(Period::Day),
            "week" | "w" => Ok(Period::Week),
            "month" | "m" => Ok(Period::Month),
            "year" | "y" => Ok(Period::Year),
            _ => Err(anyhow::anyhow!("Invalid period: {}", s)),
        }
    }
}

/// Grouping key for one bucket. Ordering is calendar order within a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketKey {
    Day(NaiveDate),
    Week { year: i32, week: u32 },
    Month { year: i32, month: u32 },
    Year(i32),
}

impl Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BucketKey::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            BucketKey::Week { year, week } => write!(f, "{year}-W{week}"),
            BucketKey::Month { year, month } => write!(f, "{year}-{month:02}"),
            BucketKey::Year(year) => write!(f, "{year}"),
        }
    }
}

/// Ordinal week number: `ceil((days since Jan 1 + weekday of Jan 1 + 1) / 7)`
/// with weekdays counted from Sunday = 0. Weeks therefore start on Sunday and
/// week 1 may be partial. This is not ISO-8601 numbering.
pub fn week_of_year(date: NaiveDate) -> u32 {
    let jan1_weekday = date
        .with_ordinal(1)
        .map_or(0, |jan1| jan1.weekday().num_days_from_sunday());
    let offset = date.ordinal0() + jan1_weekday + 1;
    offset.div_ceil(7)
}
