//! Businesses and the dated ledger entries they own.
//!
//! The sign of [`Entry::amount`] is the only revenue/expense classifier:
//! non-negative amounts are revenue, negative amounts are expenses.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, de::IgnoredAny};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl Entry {
    /// Calendar date of the entry, `None` when the stored text does not parse.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_entry_date(&self.date)
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    pub fn description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }

    pub fn channel(&self) -> Option<&str> {
        non_blank(self.channel.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entries: Vec<Entry>,
}

impl Business {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entry_mut(&mut self, id: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }
}

/// Iterates every entry of every business, in storage order.
pub fn all_entries(businesses: &[Business]) -> impl Iterator<Item = &Entry> {
    businesses.iter().flat_map(|b| b.entries.iter())
}

/// Parses the date formats the dashboard has written over time: plain
/// `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_entry_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Non-numeric amounts are coerced to zero instead of failing the whole load.
fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(n) => n,
        RawAmount::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        RawAmount::Other(_) => 0.0,
    };
    Ok(if amount.is_finite() { amount } else { 0.0 })
}

/// Treats an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_browser_blob() {
        let json = r#"[
            {"id": "biz_1", "name": "Shop", "entries": [
                {"id": "e_1", "date": "2024-01-15", "amount": 100, "description": "", "channel": "sale"},
                {"id": "e_2", "date": "2024-02-10", "amount": "-40.5"},
                {"id": "e_3", "date": "2024-02-11", "amount": "abc"},
                {"id": "e_4", "date": "2024-02-12", "amount": null}
            ]},
            {"id": "biz_2", "name": "Empty", "entries": null},
            {"id": "biz_3", "name": "No entries field"}
        ]"#;

        let businesses: Vec<Business> = serde_json::from_str(json).unwrap();
        assert_eq!(businesses.len(), 3);
        let shop = &businesses[0];
        assert_eq!(shop.entries[0].amount, 100.0);
        assert_eq!(shop.entries[0].channel(), Some("sale"));
        assert_eq!(shop.entries[0].description(), None);
        assert_eq!(shop.entries[1].amount, -40.5);
        assert!(shop.entries[1].is_expense());
        assert_eq!(shop.entries[2].amount, 0.0);
        assert_eq!(shop.entries[3].amount, 0.0);
        assert!(businesses[1].entries.is_empty());
        assert!(businesses[2].entries.is_empty());
    }

    #[test]
    fn test_parse_entry_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse_entry_date("2024-03-01"), Some(expected));
        assert_eq!(parse_entry_date(" 2024-03-01 "), Some(expected));
        assert_eq!(parse_entry_date("2024-03-01T10:30:00Z"), Some(expected));
        assert_eq!(parse_entry_date("2024-03-01T10:30:00"), Some(expected));
        assert_eq!(parse_entry_date("not a date"), None);
        assert_eq!(parse_entry_date("2024-13-01"), None);
        assert_eq!(parse_entry_date(""), None);
    }

    #[test]
    fn test_serialize_skips_missing_optionals() {
        let entry = Entry {
            id: "e_1".to_string(),
            date: "2024-01-15".to_string(),
            amount: 12.5,
            description: None,
            channel: Some("online".to_string()),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"id":"e_1","date":"2024-01-15","amount":12.5,"channel":"online"}"#
        );
    }
}
