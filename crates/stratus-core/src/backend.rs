use std::io::Cursor;

use stratus_storage::{JobDescription, StorageBackend};

use crate::config::StratusConfig;
use crate::error::Result;
use crate::glacier::GlacierBackend;
use crate::mirror::MIRROR_KEY;
use crate::storage;

pub use crate::config::BackendKind;

/// Outcome of a download request.
#[derive(Debug)]
pub enum Retrieval {
    /// Nothing is stored under the requested name.
    Missing,
    /// A retrieval job exists but has not finished yet.
    Pending(JobDescription),
    /// Full content, positioned at the start.
    Ready(Cursor<Vec<u8>>),
}

/// Operations every archive destination supports.
pub trait BackupBackend {
    fn upload(&self, name: &str, data: &[u8]) -> Result<()>;

    fn download(&self, name: &str) -> Result<Retrieval>;

    /// Names of all stored archives.
    fn list(&self) -> Result<Vec<String>>;

    /// Delete a stored archive. Unknown names are a no-op.
    fn delete(&self, name: &str) -> Result<()>;

    /// Provider checksum of a stored archive, `None` if unknown.
    fn checksum(&self, name: &str) -> Result<Option<String>>;

    /// Create the bucket, container or vault.
    fn init(&self) -> Result<()>;

    fn location(&self) -> String;
}

/// Build the backend selected by `kind` from explicit configuration.
pub fn open_backend(kind: BackendKind, config: &StratusConfig) -> Result<Box<dyn BackupBackend>> {
    Ok(match kind {
        BackendKind::S3 => Box::new(ObjectBackend::new(Box::new(storage::s3_store(config)?))),
        BackendKind::Cloudfiles => Box::new(ObjectBackend::new(Box::new(
            storage::cloudfiles_store(config)?,
        ))),
        BackendKind::Glacier => Box::new(GlacierBackend::from_config(config)?),
    })
}

/// Archive destination over a plain object store (S3, Cloudfiles).
pub struct ObjectBackend {
    store: Box<dyn StorageBackend>,
}

impl ObjectBackend {
    pub fn new(store: Box<dyn StorageBackend>) -> Self {
        Self { store }
    }
}

impl BackupBackend for ObjectBackend {
    fn upload(&self, name: &str, data: &[u8]) -> Result<()> {
        self.store.put(name, data)
    }

    fn download(&self, name: &str) -> Result<Retrieval> {
        Ok(match self.store.get(name)? {
            Some(data) => Retrieval::Ready(Cursor::new(data)),
            None => Retrieval::Missing,
        })
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = self.store.list("")?;
        // The Glacier inventory mirror may share the S3 bucket.
        names.retain(|n| n != MIRROR_KEY);
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.store.delete(name)
    }

    fn checksum(&self, name: &str) -> Result<Option<String>> {
        self.store.checksum(name)
    }

    fn init(&self) -> Result<()> {
        self.store.create_container()
    }

    fn location(&self) -> String {
        self.store.location()
    }
}
