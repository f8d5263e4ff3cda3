use super::{BusinessRepository, STORAGE_KEY, decode_collection, encode_collection};
use crate::core::model::Business;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::{debug, warn};

const PARTITION: &str = "businesses";

/// Repository backed by a fjall keyspace on disk. The collection is one value
/// under [`STORAGE_KEY`].
pub struct DiskRepository {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskRepository {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open business partition")?;
        debug!("Opened business store at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }
}

impl BusinessRepository for DiskRepository {
    fn load(&self) -> Vec<Business> {
        match self.partition.get(STORAGE_KEY) {
            Ok(blob) => decode_collection(blob.as_deref()),
            Err(e) => {
                warn!(error = %e, "Failed to read stored collection, starting empty");
                Vec::new()
            }
        }
    }

    fn save(&self, businesses: &[Business]) -> Result<()> {
        let blob = encode_collection(businesses)?;
        self.partition
            .insert(STORAGE_KEY, blob)
            .context("Failed to write business collection")?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to flush business collection")?;
        debug!("Saved {} businesses", businesses.len());
        Ok(())
    }
}
