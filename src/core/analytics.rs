//! Aggregation over the business collection: net worth, period buckets,
//! running totals and range-bounded ratios.
//!
//! Every function here is total. Malformed amounts have already been coerced
//! to zero when the collection was loaded, entries with unparseable dates are
//! skipped by date-keyed views only, and empty input yields empty or `None`
//! results rather than an error.
use crate::core::model::{Business, Entry, all_entries};
use crate::core::period::{BucketKey, Period};
use chrono::{Days, Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Number of days shown by a day-bucketed view with no dated entries.
pub const EMPTY_DAY_WINDOW: u64 = 30;

/// Index-aligned chart labels and values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Running total over `data`, same length.
    pub fn cumulative(&self) -> Vec<f64> {
        cumulative(&self.data)
    }

    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels.iter().map(String::as_str).zip(self.data.iter().copied())
    }

    fn from_buckets(buckets: BTreeMap<BucketKey, f64>) -> Self {
        let (labels, data) = buckets
            .into_iter()
            .map(|(key, sum)| (key.to_string(), sum))
            .unzip();
        Self { labels, data }
    }
}

/// Which ratio [`ratio_for_range`] computes. The two use different
/// denominators and are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioKind {
    /// `(revenue - expense) / revenue * 100`
    ProfitMargin,
    /// `(revenue - expense) / expense * 100`
    Roi,
}

/// Revenue/expense split of a set of entries.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeTotals {
    pub revenue: f64,
    pub expense: f64,
    pub count: usize,
}

impl RangeTotals {
    /// Splits `entries` by sign into revenue and absolute expense.
    pub fn of<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        entries
            .into_iter()
            .fold(RangeTotals::default(), |mut totals, e| {
                if e.amount >= 0.0 {
                    totals.revenue += e.amount;
                } else {
                    totals.expense += e.amount.abs();
                }
                totals.count += 1;
                totals
            })
    }

    pub fn ratio(&self, kind: RatioKind) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        let denominator = match kind {
            RatioKind::ProfitMargin => self.revenue,
            RatioKind::Roi => self.expense,
        };
        if denominator == 0.0 {
            return None;
        }
        Some((self.revenue - self.expense) / denominator * 100.0)
    }
}

/// Sum of every entry amount across every business, dated or not.
pub fn net_worth(businesses: &[Business]) -> f64 {
    all_entries(businesses).map(|e| e.amount).sum()
}

/// Buckets `entries` by `period`, using the local calendar date for the
/// empty day view.
pub fn aggregate<'a>(entries: impl IntoIterator<Item = &'a Entry>, period: Period) -> Series {
    aggregate_as_of(entries, period, Local::now().date_naive())
}

/// Buckets `entries` by `period` and sums each bucket.
///
/// Day buckets are gap-filled: one point for every calendar day between the
/// earliest and latest dated entry, or the [`EMPTY_DAY_WINDOW`] days ending
/// `today` when there is none. Other periods list only the buckets that
/// received entries, in calendar order.
pub fn aggregate_as_of<'a>(
    entries: impl IntoIterator<Item = &'a Entry>,
    period: Period,
    today: NaiveDate,
) -> Series {
    let mut buckets: BTreeMap<BucketKey, f64> = BTreeMap::new();
    let mut skipped = 0usize;

    for entry in entries {
        match entry.parsed_date() {
            Some(date) => *buckets.entry(period.bucket(date)).or_insert(0.0) += entry.amount,
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!("Skipped {skipped} entries with unparseable dates while bucketing by {period}");
    }

    if period != Period::Day {
        return Series::from_buckets(buckets);
    }

    let days = buckets.keys().filter_map(|key| match key {
        BucketKey::Day(date) => Some(*date),
        _ => None,
    });
    let (start, end) = match (days.clone().min(), days.max()) {
        (Some(min), Some(max)) => (min, max),
        _ => (
            today
                .checked_sub_days(Days::new(EMPTY_DAY_WINDOW - 1))
                .unwrap_or(today),
            today,
        ),
    };

    let mut series = Series::default();
    for day in start.iter_days().take_while(|d| *d <= end) {
        let key = BucketKey::Day(day);
        series.labels.push(key.to_string());
        series.data.push(buckets.get(&key).copied().unwrap_or(0.0));
    }
    series
}

/// Running prefix sum: `out[0] = data[0]`, `out[i] = out[i - 1] + data[i]`.
pub fn cumulative(data: &[f64]) -> Vec<f64> {
    data.iter()
        .scan(0.0, |running, value| {
            *running += value;
            Some(*running)
        })
        .collect()
}

/// Monthly totals across all businesses, the overview revenue view.
pub fn overview_by_month(businesses: &[Business]) -> Series {
    aggregate(all_entries(businesses), Period::Month)
}

/// Revenue and expense of the entries dated within `[start, end]`.
pub fn range_totals(businesses: &[Business], start: NaiveDate, end: NaiveDate) -> RangeTotals {
    RangeTotals::of(
        all_entries(businesses)
            .filter(|e| e.parsed_date().is_some_and(|d| d >= start && d <= end)),
    )
}

/// Profit margin or ROI over `[start, end]`; `None` when not computable.
pub fn ratio_for_range(
    businesses: &[Business],
    start: NaiveDate,
    end: NaiveDate,
    kind: RatioKind,
) -> Option<f64> {
    let totals = range_totals(businesses, start, end);
    let ratio = totals.ratio(kind);
    debug!(
        "{kind:?} for {start}..={end}: revenue={}, expense={}, entries={} -> {ratio:?}",
        totals.revenue, totals.expense, totals.count
    );
    ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(amount: f64, date: &str) -> Entry {
        Entry {
            id: format!("e_{date}_{amount}"),
            date: date.to_string(),
            amount,
            description: None,
            channel: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn business(entries: Vec<Entry>) -> Business {
        Business {
            id: "biz_1".to_string(),
            name: "Shop".to_string(),
            entries,
        }
    }

    fn scenario() -> Vec<Business> {
        vec![business(vec![
            entry(100.0, "2024-01-15"),
            entry(-40.0, "2024-02-10"),
            entry(60.0, "2024-02-20"),
        ])]
    }

    #[test]
    fn test_monthly_scenario() {
        let businesses = scenario();
        let series = overview_by_month(&businesses);
        assert_eq!(series.labels, vec!["2024-01", "2024-02"]);
        assert_eq!(series.data, vec![100.0, 20.0]);
        assert_eq!(series.cumulative(), vec![100.0, 120.0]);
        assert_eq!(net_worth(&businesses), 120.0);

        let (start, end) = (date("2024-01-01"), date("2024-12-31"));
        assert_eq!(
            ratio_for_range(&businesses, start, end, RatioKind::ProfitMargin),
            Some(75.0)
        );
        assert_eq!(
            ratio_for_range(&businesses, start, end, RatioKind::Roi),
            Some(300.0)
        );
    }

    #[test]
    fn test_net_worth_ignores_date_validity() {
        let businesses = vec![
            business(vec![entry(10.0, "garbage"), entry(-3.5, "2024-01-01")]),
            business(vec![entry(5.0, "")]),
        ];
        assert_eq!(net_worth(&businesses), 11.5);
        assert_eq!(net_worth(&[]), 0.0);
    }

    #[test]
    fn test_single_entry_day_aggregate() {
        let entries = [entry(50.0, "2024-03-01")];
        let series = aggregate_as_of(&entries, Period::Day, date("2025-01-01"));
        assert_eq!(series.labels, vec!["2024-03-01"]);
        assert_eq!(series.data, vec![50.0]);
    }

    #[test]
    fn test_day_aggregate_fills_gaps() {
        let entries = [
            entry(10.0, "2024-02-27"),
            entry(5.0, "2024-03-02"),
            entry(-2.0, "2024-02-27"),
            entry(99.0, "bad date"),
        ];
        let series = aggregate_as_of(&entries, Period::Day, date("2025-01-01"));
        assert_eq!(
            series.labels,
            vec![
                "2024-02-27",
                "2024-02-28",
                "2024-02-29",
                "2024-03-01",
                "2024-03-02"
            ]
        );
        assert_eq!(series.data, vec![8.0, 0.0, 0.0, 0.0, 5.0]);

        let dates: Vec<NaiveDate> = series.labels.iter().map(|l| date(l)).collect();
        assert!(dates.windows(2).all(|w| w[1] == w[0].succ_opt().unwrap()));
    }

    #[test]
    fn test_day_aggregate_without_entries_covers_last_30_days() {
        let today = date("2024-03-10");
        let series = aggregate_as_of(std::iter::empty(), Period::Day, today);
        assert_eq!(series.len(), 30);
        assert_eq!(series.labels.first().unwrap(), "2024-02-10");
        assert_eq!(series.labels.last().unwrap(), "2024-03-10");
        assert!(series.data.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_day_aggregate_with_only_undated_entries_uses_window() {
        let entries = [entry(7.0, "nope")];
        let series = aggregate_as_of(&entries, Period::Day, date("2024-03-10"));
        assert_eq!(series.len(), 30);
        assert_eq!(series.data.iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn test_week_and_year_aggregates_are_chronological() {
        let entries = [
            entry(1.0, "2024-03-04"),
            entry(2.0, "2024-02-27"),
            entry(4.0, "2023-12-31"),
        ];
        let weekly = aggregate_as_of(&entries, Period::Week, date("2025-01-01"));
        assert_eq!(weekly.labels, vec!["2023-W53", "2024-W9", "2024-W10"]);
        assert_eq!(weekly.data, vec![4.0, 2.0, 1.0]);

        let yearly = aggregate_as_of(&entries, Period::Year, date("2025-01-01"));
        assert_eq!(yearly.labels, vec!["2023", "2024"]);
        assert_eq!(yearly.data, vec![4.0, 3.0]);
    }

    #[test]
    fn test_non_day_aggregate_of_nothing_is_empty() {
        let series = aggregate_as_of(std::iter::empty(), Period::Month, date("2024-01-01"));
        assert!(series.is_empty());
        assert!(series.labels.is_empty());
    }

    #[test]
    fn test_cumulative_prefix_sum() {
        assert!(cumulative(&[]).is_empty());
        let data = [3.0, -1.0, 4.0, 0.0, 2.5];
        let out = cumulative(&data);
        assert_eq!(out.len(), data.len());
        assert_eq!(out[0], data[0]);
        for i in 1..data.len() {
            assert_eq!(out[i], out[i - 1] + data[i]);
        }
    }

    #[test]
    fn test_ratios_not_computable() {
        let expenses_only = vec![business(vec![entry(-40.0, "2024-01-01")])];
        let (start, end) = (date("2024-01-01"), date("2024-12-31"));
        assert_eq!(
            ratio_for_range(&expenses_only, start, end, RatioKind::ProfitMargin),
            None
        );
        assert_eq!(
            ratio_for_range(&expenses_only, start, end, RatioKind::Roi),
            Some(-100.0)
        );

        let revenue_only = vec![business(vec![entry(40.0, "2024-01-01")])];
        assert_eq!(
            ratio_for_range(&revenue_only, start, end, RatioKind::ProfitMargin),
            Some(100.0)
        );
        assert_eq!(
            ratio_for_range(&revenue_only, start, end, RatioKind::Roi),
            None
        );
    }

    #[test]
    fn test_ratios_on_empty_range() {
        let businesses = scenario();
        let (start, end) = (date("2020-01-01"), date("2020-12-31"));
        assert_eq!(
            ratio_for_range(&businesses, start, end, RatioKind::ProfitMargin),
            None
        );
        assert_eq!(
            ratio_for_range(&businesses, start, end, RatioKind::Roi),
            None
        );
    }

    #[test]
    fn test_range_is_inclusive_and_skips_undated() {
        let businesses = vec![business(vec![
            entry(100.0, "2024-02-10"),
            entry(-25.0, "2024-02-20"),
            entry(1000.0, "2024-02-21"),
            entry(-500.0, "invalid"),
        ])];
        let totals = range_totals(&businesses, date("2024-02-10"), date("2024-02-20"));
        assert_eq!(
            totals,
            RangeTotals {
                revenue: 100.0,
                expense: 25.0,
                count: 2
            }
        );
    }

    #[test]
    fn test_zero_amount_counts_as_revenue_entry() {
        let businesses = vec![business(vec![entry(0.0, "2024-01-01")])];
        let totals = range_totals(&businesses, date("2024-01-01"), date("2024-01-01"));
        assert_eq!(totals.count, 1);
        assert_eq!(totals.ratio(RatioKind::ProfitMargin), None);
        assert_eq!(totals.ratio(RatioKind::Roi), None);
    }
}
