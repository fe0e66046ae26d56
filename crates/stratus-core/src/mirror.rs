use std::collections::BTreeMap;

use tracing::{debug, info};

use stratus_storage::StorageBackend;

use crate::error::{Result, StratusError};
use crate::inventory::InventoryStore;

/// Object key of the archive-map copy in the warm store.
pub const MIRROR_KEY: &str = "stratus_glacier_inventory";

/// Copy of the local archive map kept in a warm object store, so the
/// inventory can be rebuilt on another machine.
pub struct InventoryMirror {
    warm: Box<dyn StorageBackend>,
}

impl InventoryMirror {
    pub fn new(warm: Box<dyn StorageBackend>) -> Self {
        Self { warm }
    }

    /// Overwrite the mirror with the full local archive map. Returns the
    /// number of entries written.
    pub fn backup(&self, store: &dyn InventoryStore) -> Result<usize> {
        let archives = store.archives()?;
        let data = serde_json::to_vec(&archives)?;
        self.warm.put(MIRROR_KEY, &data)?;
        debug!(
            "mirrored {} inventory entries to {}",
            archives.len(),
            self.warm.location()
        );
        Ok(archives.len())
    }

    /// Replace the local archive map with the mirrored one. The job map is
    /// not touched. Returns the number of entries restored.
    pub fn restore(&self, store: &dyn InventoryStore) -> Result<usize> {
        let data = self
            .warm
            .get(MIRROR_KEY)?
            .ok_or_else(|| StratusError::MirrorNotFound(MIRROR_KEY.to_string()))?;
        let archives: BTreeMap<String, String> = serde_json::from_slice(&data)
            .map_err(|e| StratusError::InvalidFormat(format!("inventory mirror: {e}")))?;
        let count = archives.len();
        store.replace_archives(archives)?;
        info!("restored {count} inventory entries from {}", self.warm.location());
        Ok(count)
    }
}
