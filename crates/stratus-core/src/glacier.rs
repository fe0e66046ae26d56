use std::io::Cursor;

use tracing::{debug, info};

use stratus_storage::{ColdStorage, JobDescription};

use crate::backend::{BackupBackend, Retrieval};
use crate::config::StratusConfig;
use crate::error::{Result, StratusError};
use crate::inventory::InventoryStore;
use crate::mirror::InventoryMirror;
use crate::storage;

/// Where a named archive stands in the retrieval lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalState {
    /// No archive id recorded for the name.
    NoArchive,
    /// Archive known, no retrieval job recorded.
    NoJob,
    JobPending,
    /// The recorded job id is no longer known upstream.
    JobExpired,
    JobComplete,
}

/// Glacier destination: cold storage addressed through the local inventory,
/// with the archive map mirrored to S3 after every change.
pub struct GlacierBackend {
    cold: Box<dyn ColdStorage>,
    inventory: Box<dyn InventoryStore>,
    mirror: InventoryMirror,
}

impl GlacierBackend {
    pub fn new(
        cold: Box<dyn ColdStorage>,
        inventory: Box<dyn InventoryStore>,
        mirror: InventoryMirror,
    ) -> Self {
        Self {
            cold,
            inventory,
            mirror,
        }
    }

    /// Vault and mirror bucket come from the `aws` section; the inventory
    /// lives at the configured (or default) local path.
    pub fn from_config(config: &StratusConfig) -> Result<Self> {
        let cold = storage::glacier_client(config)?;
        let mirror = InventoryMirror::new(Box::new(storage::s3_store(config)?));
        let inventory = storage::file_inventory(config)?;
        Ok(Self::new(Box::new(cold), Box::new(inventory), mirror))
    }

    pub fn inventory(&self) -> &dyn InventoryStore {
        self.inventory.as_ref()
    }

    /// Upload `data`, record its archive id under `name` and refresh the
    /// mirror. A mirror failure is returned, but the local record stays.
    pub fn upload_archive(&self, name: &str, data: &[u8]) -> Result<String> {
        let archive_id = self.cold.upload_archive(data, name)?;
        if let Some(previous) = self.inventory.put_archive_id(name, &archive_id)? {
            debug!(
                "'{name}' re-uploaded as {archive_id}; archive {previous} stays in the vault unreferenced"
            );
        }
        self.backup_inventory()?;
        Ok(archive_id)
    }

    /// Advance the retrieval of `name` by one step.
    ///
    /// Starts a job when none is recorded (or the recorded one expired),
    /// and returns the archive content once the job has completed.
    pub fn retrieve(&self, name: &str) -> Result<Retrieval> {
        let Some(archive_id) = self.inventory.get_archive_id(name)? else {
            debug!("'{name}': {:?}", RetrievalState::NoArchive);
            return Ok(Retrieval::Missing);
        };

        let mut expired = false;
        let known = match self.inventory.get_job_id(name)? {
            Some(job_id) => {
                let job = self.cold.describe_job(&job_id)?;
                if job.is_none() {
                    debug!("'{name}': {:?} ({job_id})", RetrievalState::JobExpired);
                    expired = true;
                }
                job
            }
            None => None,
        };

        let job = match known {
            Some(job) => job,
            None => {
                debug!("'{name}': {:?}, starting retrieval of {archive_id}", RetrievalState::NoJob);
                match self.cold.initiate_retrieval(&archive_id) {
                    Ok(job) => job,
                    Err(e) => {
                        if expired {
                            self.inventory.delete_job_id(name)?;
                        }
                        return Err(e);
                    }
                }
            }
        };
        self.inventory.put_job_id(name, &job.job_id)?;

        log_job_status(&job);

        if !job.completed {
            debug!("'{name}': {:?}", RetrievalState::JobPending);
            return Ok(Retrieval::Pending(job));
        }

        debug!("'{name}': {:?}", RetrievalState::JobComplete);
        let data = self.cold.job_output(&job.job_id)?;
        debug!(
            "job {} for '{name}' stays recorded; later downloads reuse its output",
            job.job_id
        );
        Ok(Retrieval::Ready(Cursor::new(data)))
    }

    /// Delete the archive recorded under `name`. Returns `false` (and does
    /// nothing remotely) when the name is unknown.
    pub fn delete_archive(&self, name: &str) -> Result<bool> {
        let Some(archive_id) = self.inventory.get_archive_id(name)? else {
            debug!("'{name}' not in inventory, nothing to delete");
            return Ok(false);
        };
        self.cold.delete_archive(&archive_id)?;
        self.inventory.delete_archive_id(name)?;
        self.backup_inventory()?;
        Ok(true)
    }

    /// Names recorded in the local inventory.
    pub fn names(&self) -> Result<Vec<String>> {
        Ok(self.inventory.archives()?.into_keys().collect())
    }

    pub fn backup_inventory(&self) -> Result<usize> {
        self.mirror.backup(self.inventory.as_ref())
    }

    pub fn restore_inventory(&self) -> Result<usize> {
        self.mirror.restore(self.inventory.as_ref())
    }
}

fn log_job_status(job: &JobDescription) {
    let completed = job
        .completion_date
        .map(|d| d.to_rfc3339())
        .unwrap_or_else(|| "None".to_string());
    info!(
        "Job {}: {} ({}/{})",
        job.action,
        job.status_code,
        job.creation_date.to_rfc3339(),
        completed
    );
}

impl BackupBackend for GlacierBackend {
    fn upload(&self, name: &str, data: &[u8]) -> Result<()> {
        self.upload_archive(name, data).map(|_| ())
    }

    fn download(&self, name: &str) -> Result<Retrieval> {
        self.retrieve(name)
    }

    fn list(&self) -> Result<Vec<String>> {
        self.names()
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.delete_archive(name).map(|_| ())
    }

    fn checksum(&self, _name: &str) -> Result<Option<String>> {
        Err(StratusError::UnsupportedBackend(
            "glacier (checksums are only available for s3 and cloudfiles)".into(),
        ))
    }

    fn init(&self) -> Result<()> {
        self.cold.create_vault()
    }

    fn location(&self) -> String {
        self.cold.location()
    }
}
