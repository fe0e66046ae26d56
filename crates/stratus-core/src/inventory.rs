use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StratusError};

/// Persisted Glacier bookkeeping: stored name to archive id, and stored name
/// to the id of the retrieval job last started for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub archives: BTreeMap<String, String>,
    #[serde(default)]
    pub jobs: BTreeMap<String, String>,
}

/// Local archive/job inventory.
///
/// Every provided operation is one scoped read-modify-write cycle over
/// [`load`](Self::load) and [`save`](Self::save); nothing is held open
/// between calls. There is no cross-process locking: concurrent writers
/// are last-writer-wins.
pub trait InventoryStore: Send + Sync {
    /// Read the persisted inventory. A store that was never written yields
    /// an empty inventory.
    fn load(&self) -> Result<Inventory>;

    /// Replace the persisted inventory.
    fn save(&self, inventory: &Inventory) -> Result<()>;

    fn modify(&self, f: &mut dyn FnMut(&mut Inventory)) -> Result<()> {
        let mut inventory = self.load()?;
        f(&mut inventory);
        self.save(&inventory)
    }

    fn get_archive_id(&self, name: &str) -> Result<Option<String>> {
        Ok(self.load()?.archives.get(name).cloned())
    }

    /// Record `archive_id` under `name` and return the id it replaced, if any.
    fn put_archive_id(&self, name: &str, archive_id: &str) -> Result<Option<String>> {
        let mut previous = None;
        self.modify(&mut |inv: &mut Inventory| {
            previous = inv
                .archives
                .insert(name.to_string(), archive_id.to_string());
        })?;
        Ok(previous)
    }

    fn delete_archive_id(&self, name: &str) -> Result<()> {
        self.modify(&mut |inv: &mut Inventory| {
            inv.archives.remove(name);
        })
    }

    fn get_job_id(&self, name: &str) -> Result<Option<String>> {
        Ok(self.load()?.jobs.get(name).cloned())
    }

    fn put_job_id(&self, name: &str, job_id: &str) -> Result<()> {
        self.modify(&mut |inv: &mut Inventory| {
            inv.jobs.insert(name.to_string(), job_id.to_string());
        })
    }

    fn delete_job_id(&self, name: &str) -> Result<()> {
        self.modify(&mut |inv: &mut Inventory| {
            inv.jobs.remove(name);
        })
    }

    fn archives(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.load()?.archives)
    }

    /// Replace the whole archive map. The job map is left untouched.
    fn replace_archives(&self, archives: BTreeMap<String, String>) -> Result<()> {
        let mut archives = Some(archives);
        self.modify(&mut |inv: &mut Inventory| {
            if let Some(a) = archives.take() {
                inv.archives = a;
            }
        })
    }
}

impl<T: InventoryStore + ?Sized> InventoryStore for Arc<T> {
    fn load(&self) -> Result<Inventory> {
        (**self).load()
    }

    fn save(&self, inventory: &Inventory) -> Result<()> {
        (**self).save(inventory)
    }
}

/// JSON file inventory, rewritten atomically on every save.
pub struct FileInventory {
    path: PathBuf,
}

impl FileInventory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InventoryStore for FileInventory {
    fn load(&self) -> Result<Inventory> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no inventory at {}, starting empty", self.path.display());
                return Ok(Inventory::default());
            }
            Err(e) => return Err(e.into()),
        };
        if data.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Inventory::default());
        }
        serde_json::from_slice(&data).map_err(|e| {
            StratusError::InvalidFormat(format!("inventory {}: {e}", self.path.display()))
        })
    }

    fn save(&self, inventory: &Inventory) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let data = serde_json::to_vec_pretty(inventory)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// In-process inventory, used where no file should be touched.
#[derive(Default)]
pub struct MemoryInventory {
    inner: Mutex<Inventory>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(inventory: Inventory) -> Self {
        Self {
            inner: Mutex::new(inventory),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inventory>> {
        self.inner
            .lock()
            .map_err(|_| StratusError::Other("inventory mutex poisoned".into()))
    }
}

impl InventoryStore for MemoryInventory {
    fn load(&self) -> Result<Inventory> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, inventory: &Inventory) -> Result<()> {
        *self.lock()? = inventory.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileInventory::new(tmp.path().join("inventory.json"));
        assert_eq!(store.load().unwrap(), Inventory::default());
        assert_eq!(store.get_archive_id("anything").unwrap(), None);
    }

    #[test]
    fn save_creates_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileInventory::new(tmp.path().join("a/b/inventory.json"));
        store.put_archive_id("x", "A1").unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn file_format_has_both_maps() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileInventory::new(tmp.path().join("inventory.json"));
        store.put_archive_id("alpha", "A1").unwrap();
        store.put_job_id("alpha", "J1").unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(raw["archives"]["alpha"], "A1");
        assert_eq!(raw["jobs"]["alpha"], "J1");
    }

    #[test]
    fn either_map_may_be_missing_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("inventory.json");
        std::fs::write(&path, r#"{"archives": {"alpha": "A1"}}"#).unwrap();
        let store = FileInventory::new(&path);
        assert_eq!(store.get_archive_id("alpha").unwrap().as_deref(), Some("A1"));
        assert_eq!(store.get_job_id("alpha").unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_invalid_format() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("inventory.json");
        std::fs::write(&path, "not json").unwrap();
        let err = FileInventory::new(&path).load().unwrap_err();
        assert!(matches!(err, StratusError::InvalidFormat(_)));
    }

    #[test]
    fn put_returns_shadowed_id() {
        let store = MemoryInventory::new();
        assert_eq!(store.put_archive_id("x", "A1").unwrap(), None);
        assert_eq!(
            store.put_archive_id("x", "A2").unwrap().as_deref(),
            Some("A1")
        );
        assert_eq!(store.get_archive_id("x").unwrap().as_deref(), Some("A2"));
    }

    #[test]
    fn delete_missing_entry_is_noop() {
        let store = MemoryInventory::new();
        store.delete_archive_id("nope").unwrap();
        store.delete_job_id("nope").unwrap();
        assert_eq!(store.load().unwrap(), Inventory::default());
    }

    #[test]
    fn replace_archives_keeps_jobs() {
        let store = MemoryInventory::new();
        store.put_archive_id("old", "A0").unwrap();
        store.put_job_id("old", "J0").unwrap();

        let mut fresh = BTreeMap::new();
        fresh.insert("new".to_string(), "A9".to_string());
        store.replace_archives(fresh.clone()).unwrap();

        assert_eq!(store.archives().unwrap(), fresh);
        assert_eq!(store.get_job_id("old").unwrap().as_deref(), Some("J0"));
    }

    #[test]
    fn file_store_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("inventory.json");
        FileInventory::new(&path).put_archive_id("x", "A1").unwrap();
        let reopened = FileInventory::new(&path);
        assert_eq!(reopened.get_archive_id("x").unwrap().as_deref(), Some("A1"));
    }
}
