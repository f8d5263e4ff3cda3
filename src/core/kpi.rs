//! Headline KPIs and the text formatting the dashboard renders them with.

use crate::core::analytics::{self, RatioKind, Series};
use crate::core::model::Business;
use chrono::{Datelike, NaiveDate};
use std::fmt::Display;

/// Colour class for a KPI or delta value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Negative,
    Neutral,
    Positive,
}

impl Trend {
    pub fn of(value: f64) -> Self {
        if value < 0.0 {
            Trend::Negative
        } else if value > 0.0 {
            Trend::Positive
        } else {
            Trend::Neutral
        }
    }
}

/// Difference between two percentage-like values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta {
    Change(f64),
    /// The current value exists but there is nothing to compare it against.
    Unbounded,
    NotAvailable,
}

impl Delta {
    pub fn between(current: Option<f64>, previous: Option<f64>) -> Self {
        match (current, previous) {
            (Some(current), Some(previous)) => Delta::Change(current - previous),
            (Some(_), None) => Delta::Unbounded,
            (None, _) => Delta::NotAvailable,
        }
    }

    pub fn trend(&self) -> Trend {
        match self {
            Delta::Change(change) => Trend::of(round1(*change)),
            Delta::Unbounded => Trend::Positive,
            Delta::NotAvailable => Trend::Neutral,
        }
    }
}

impl Display for Delta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Delta::Change(change) => write!(f, "{}", format_signed_percent(*change)),
            Delta::Unbounded => write!(f, "+∞"),
            Delta::NotAvailable => write!(f, "—"),
        }
    }
}

/// Month-over-month change of the last two buckets of a monthly series.
///
/// A zero prior month reports `+0%` when the latest month is also zero and a
/// flat `+100%` otherwise, whatever the latest value is.
pub fn month_over_month(monthly: &Series) -> Delta {
    let [.., previous, last] = monthly.data.as_slice() else {
        return Delta::NotAvailable;
    };
    if *previous == 0.0 {
        return Delta::Change(if *last == 0.0 { 0.0 } else { 100.0 });
    }
    Delta::Change((last - previous) / previous.abs() * 100.0)
}

/// Everything the overview screen shows, computed in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub net_worth: f64,
    pub trend: Delta,
    /// Profit margin from January 1st to `today`.
    pub profit_margin: Option<f64>,
    /// Year-to-date margin against the whole previous year's margin.
    pub profit_margin_delta: Delta,
    pub revenue_by_month: Series,
    pub wealth_by_month: Series,
}

impl Dashboard {
    pub fn compute(businesses: &[Business], today: NaiveDate) -> Self {
        let revenue_by_month = analytics::overview_by_month(businesses);
        let wealth_by_month = Series {
            labels: revenue_by_month.labels.clone(),
            data: revenue_by_month.cumulative(),
        };

        let profit_margin = year_start(today.year()).and_then(|start| {
            analytics::ratio_for_range(businesses, start, today, RatioKind::ProfitMargin)
        });
        let previous_margin = year_bounds(today.year() - 1).and_then(|(start, end)| {
            analytics::ratio_for_range(businesses, start, end, RatioKind::ProfitMargin)
        });

        Self {
            net_worth: analytics::net_worth(businesses),
            trend: month_over_month(&revenue_by_month),
            profit_margin,
            profit_margin_delta: Delta::between(profit_margin, previous_margin),
            revenue_by_month,
            wealth_by_month,
        }
    }

    pub fn profit_margin_text(&self) -> String {
        self.profit_margin
            .map_or_else(|| "—%".to_string(), format_percent)
    }

    pub fn profit_margin_trend(&self) -> Trend {
        self.profit_margin.map_or(Trend::Neutral, |m| Trend::of(round1(m)))
    }
}

fn year_start(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}

fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((year_start(year)?, NaiveDate::from_ymd_opt(year, 12, 31)?))
}

fn round1(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    // Avoid rendering "-0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// One decimal, trailing `.0` dropped: `75%`, `12.4%`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", round1(value))
}

/// Like [`format_percent`] with an explicit `+` on non-negative values.
pub fn format_signed_percent(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{}%", round1(value))
}

/// `MAD 248,450` for whole amounts, `MAD 1,234.50` otherwise.
pub fn format_currency(amount: f64, currency: &str) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let magnitude = amount.abs();
    let body = if magnitude.fract() == 0.0 {
        group_thousands(&format!("{magnitude:.0}"))
    } else {
        let fixed = format!("{magnitude:.2}");
        match fixed.split_once('.') {
            Some((whole, cents)) => format!("{}.{cents}", group_thousands(whole)),
            None => fixed,
        }
    };
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{currency} {sign}{body}")
}

/// Ledger-row style: the sign goes in front of the currency (`-MAD 40`).
pub fn format_entry_amount(amount: f64, currency: &str) -> String {
    if amount < 0.0 {
        format!("-{}", format_currency(amount.abs(), currency))
    } else {
        format_currency(amount, currency)
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
