//! Mutations of the business collection.
//!
//! A [`Ledger`] owns the full list of businesses between a repository load and
//! the save that follows every mutation.

use crate::core::model::{Business, Entry};
use anyhow::{Context, Result, bail};
use chrono::Utc;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use tracing::debug;

pub const BUSINESS_ID_PREFIX: &str = "biz";
pub const ENTRY_ID_PREFIX: &str = "e";

static LAST_ISSUED: AtomicI64 = AtomicI64::new(0);

/// Form values for creating or editing an entry. The stored amount takes its
/// sign from `is_expense`, never from the sign of `amount` itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryInput {
    pub date: String,
    pub amount: f64,
    pub is_expense: bool,
    pub description: Option<String>,
    pub channel: Option<String>,
}

impl EntryInput {
    pub fn signed_amount(&self) -> f64 {
        if self.is_expense {
            -self.amount.abs()
        } else {
            self.amount.abs()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.date.trim().is_empty() || !self.amount.is_finite() {
            bail!("Enter date and amount");
        }
        Ok(())
    }

    fn apply(&self, entry: &mut Entry) {
        entry.date = self.date.trim().to_string();
        entry.amount = self.signed_amount();
        entry.description = trimmed(self.description.as_deref());
        entry.channel = trimmed(self.channel.as_deref());
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    businesses: Vec<Business>,
}

impl Ledger {
    pub fn new(businesses: Vec<Business>) -> Self {
        Self { businesses }
    }

    pub fn businesses(&self) -> &[Business] {
        &self.businesses
    }

    pub fn into_inner(self) -> Vec<Business> {
        self.businesses
    }

    /// Looks a business up by id, then by case-insensitive name.
    pub fn find(&self, key: &str) -> Option<&Business> {
        self.position(key).map(|i| &self.businesses[i])
    }

    pub fn create_business(&mut self, name: &str) -> Result<&Business> {
        let name = name.trim();
        if name.is_empty() {
            bail!("Enter a business name");
        }
        let id = next_id(
            BUSINESS_ID_PREFIX,
            self.businesses.iter().map(|b| b.id.as_str()),
        );
        debug!("Creating business {id} ({name})");
        self.businesses.push(Business::new(id, name));
        let last = self.businesses.len() - 1;
        Ok(&self.businesses[last])
    }

    /// Removes a business and every entry it owns.
    pub fn remove_business(&mut self, key: &str) -> Option<Business> {
        let index = self.position(key)?;
        let removed = self.businesses.remove(index);
        debug!(
            "Removed business {} with {} entries",
            removed.id,
            removed.entries.len()
        );
        Some(removed)
    }

    pub fn add_entry(&mut self, business: &str, input: &EntryInput) -> Result<&Entry> {
        input.validate()?;
        let index = self.require(business)?;
        let id = next_id(
            ENTRY_ID_PREFIX,
            self.businesses
                .iter()
                .flat_map(|b| b.entries.iter())
                .map(|e| e.id.as_str()),
        );
        let mut entry = Entry {
            id,
            date: String::new(),
            amount: 0.0,
            description: None,
            channel: None,
        };
        input.apply(&mut entry);
        debug!("Adding entry {} to {}", entry.id, self.businesses[index].id);

        let entries = &mut self.businesses[index].entries;
        entries.push(entry);
        let last = entries.len() - 1;
        Ok(&entries[last])
    }

    /// Rewrites an entry in place, keeping its id and position.
    pub fn edit_entry(
        &mut self,
        business: &str,
        entry_id: &str,
        input: &EntryInput,
    ) -> Result<&Entry> {
        input.validate()?;
        let index = self.require(business)?;
        let entry = self.businesses[index]
            .entry_mut(entry_id)
            .with_context(|| format!("Entry not found: {entry_id}"))?;
        input.apply(entry);
        debug!("Edited entry {entry_id}");
        Ok(entry)
    }

    pub fn delete_entry(&mut self, business: &str, entry_id: &str) -> Result<Entry> {
        let index = self.require(business)?;
        let entries = &mut self.businesses[index].entries;
        let position = entries
            .iter()
            .position(|e| e.id == entry_id)
            .with_context(|| format!("Entry not found: {entry_id}"))?;
        debug!("Deleting entry {entry_id}");
        Ok(entries.remove(position))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.businesses
            .iter()
            .position(|b| b.id == key)
            .or_else(|| {
                self.businesses
                    .iter()
                    .position(|b| b.name.eq_ignore_ascii_case(key.trim()))
            })
    }

    fn require(&self, key: &str) -> Result<usize> {
        self.position(key)
            .with_context(|| format!("Business not found: {key}"))
    }
}

/// Entries ordered newest first. Undated entries go last and ties keep
/// insertion order.
pub fn entries_latest_first(business: &Business) -> Vec<&Entry> {
    let mut rows: Vec<&Entry> = business.entries.iter().collect();
    rows.sort_by(|a, b| match (a.parsed_date(), b.parsed_date()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    rows
}

/// Issues `<prefix>_<n>` where `n` is the current millisecond timestamp,
/// raised past every id already in `existing` and every id issued earlier
/// in this process.
pub fn next_id<'a>(prefix: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let floor = highest_suffix(prefix, existing);
    let now = Utc::now().timestamp_millis();
    let previous = LAST_ISSUED
        .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |last| {
            Some(following(now, last, floor))
        })
        .unwrap_or_else(|last| last);
    format!("{prefix}_{}", following(now, previous, floor))
}

fn highest_suffix<'a>(prefix: &str, ids: impl IntoIterator<Item = &'a str>) -> i64 {
    ids.into_iter()
        .filter_map(|id| id.strip_prefix(prefix)?.strip_prefix('_')?.parse::<i64>().ok())
        .max()
        .unwrap_or(0)
}

/// Smallest value at or after `now` above both `last` and `floor`. Saturates
/// at `i64::MAX` for ids stored at the top of the range.
fn following(now: i64, last: i64, floor: i64) -> i64 {
    now.max(last.saturating_add(1)).max(floor.saturating_add(1))
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
