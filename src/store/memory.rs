use super::{BusinessRepository, decode_collection, encode_collection};
use crate::core::model::Business;
use anyhow::{Result, anyhow};
use std::sync::RwLock;
use tracing::debug;

/// In-process repository. Holds the serialized blob rather than the values so
/// that loads go through the same decoding as the disk store.
#[derive(Default)]
pub struct MemoryRepository {
    blob: RwLock<Option<Vec<u8>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an arbitrary stored blob, e.g. one written by another client.
    pub fn with_blob(blob: impl Into<Vec<u8>>) -> Self {
        Self {
            blob: RwLock::new(Some(blob.into())),
        }
    }
}

impl BusinessRepository for MemoryRepository {
    fn load(&self) -> Vec<Business> {
        match self.blob.read() {
            Ok(blob) => decode_collection(blob.as_deref()),
            Err(_) => Vec::new(),
        }
    }

    fn save(&self, businesses: &[Business]) -> Result<()> {
        let encoded = encode_collection(businesses)?;
        let mut blob = self
            .blob
            .write()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;
        *blob = Some(encoded);
        debug!("Saved {} businesses in memory", businesses.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_repository() {
        let repo = MemoryRepository::new();
        assert!(repo.load().is_empty());

        let businesses = vec![Business::new("biz_1", "Shop")];
        repo.save(&businesses).unwrap();
        assert_eq!(repo.load(), businesses);
    }

    #[test]
    fn test_with_corrupt_blob() {
        let repo = MemoryRepository::with_blob("[{\"id\":");
        assert!(repo.load().is_empty());

        // The next save overwrites the corrupt data.
        repo.save(&[Business::new("biz_1", "Shop")]).unwrap();
        assert_eq!(repo.load().len(), 1);
    }
}
