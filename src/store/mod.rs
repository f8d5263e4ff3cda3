//! Persistence of the business collection as a single serialized blob.

pub mod disk;
pub mod memory;

use crate::core::model::Business;
use anyhow::{Context, Result};
use tracing::{debug, warn};

pub use disk::DiskRepository;
pub use memory::MemoryRepository;

/// Key the collection blob is stored under.
pub const STORAGE_KEY: &str = "ed_businesses_v1";

/// Whole-collection load/save. `load` never fails: missing or unreadable
/// data yields an empty collection.
pub trait BusinessRepository: Send + Sync {
    fn load(&self) -> Vec<Business>;
    fn save(&self, businesses: &[Business]) -> Result<()>;
}

/// Decodes a stored blob. Anything that is not a JSON array of businesses is
/// treated as an empty collection.
pub fn decode_collection(blob: Option<&[u8]>) -> Vec<Business> {
    let Some(bytes) = blob else {
        debug!("No stored collection, starting empty");
        return Vec::new();
    };
    match serde_json::from_slice::<Vec<Business>>(bytes) {
        Ok(businesses) => {
            debug!("Loaded {} businesses", businesses.len());
            businesses
        }
        Err(e) => {
            warn!(error = %e, "Stored collection is corrupt, starting empty");
            Vec::new()
        }
    }
}

pub fn encode_collection(businesses: &[Business]) -> Result<Vec<u8>> {
    serde_json::to_vec(businesses).context("Failed to serialize business collection")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_missing_or_corrupt_is_empty() {
        assert!(decode_collection(None).is_empty());
        assert!(decode_collection(Some(b"not json")).is_empty());
        assert!(decode_collection(Some(br#"{"id":"biz_1"}"#)).is_empty());
        assert!(decode_collection(Some(b"null")).is_empty());
    }

    #[test]
    fn test_decode_coerces_malformed_amounts() {
        let blob = br#"[{"id":"biz_1","name":"Shop","entries":[
            {"id":"e_1","date":"2024-01-15","amount":"abc"},
            {"id":"e_2","date":"2024-01-16","amount":"12.5"}
        ]}]"#;
        let businesses = decode_collection(Some(blob));
        assert_eq!(businesses.len(), 1);
        assert_eq!(businesses[0].entries[0].amount, 0.0);
        assert_eq!(businesses[0].entries[1].amount, 12.5);
    }

    #[test]
    fn test_encode_then_decode() -> Result<()> {
        let mut shop = Business::new("biz_1", "Shop");
        shop.entries.push(crate::core::model::Entry {
            id: "e_1".to_string(),
            date: "2024-02-10".to_string(),
            amount: -40.0,
            description: Some("beans".to_string()),
            channel: None,
        });
        let blob = encode_collection(std::slice::from_ref(&shop))?;
        assert_eq!(decode_collection(Some(&blob)), vec![shop]);
        Ok(())
    }
}
