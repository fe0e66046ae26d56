use std::path::Path;

use chrono::{DateTime, Local};
use tracing::info;

use crate::archive;
use crate::backend::BackupBackend;
use crate::crypto::{self, KdfParams};
use crate::error::Result;
use crate::naming::stored_name;

/// Result of a successful backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupOutcome {
    pub stored_name: String,
    /// Uploaded size in bytes (compressed, and encrypted if applicable).
    pub size: usize,
    pub encrypted: bool,
}

/// Run `stratus backup`.
pub fn run(
    backend: &dyn BackupBackend,
    path: &Path,
    name_format: &str,
    password: Option<&str>,
) -> Result<BackupOutcome> {
    run_with(
        backend,
        path,
        name_format,
        password,
        KdfParams::default(),
        Local::now(),
    )
}

pub fn run_with(
    backend: &dyn BackupBackend,
    path: &Path,
    name_format: &str,
    password: Option<&str>,
    kdf: KdfParams,
    now: DateTime<Local>,
) -> Result<BackupOutcome> {
    let base = archive::base_name(path)?;
    let encrypted = password.is_some();
    let name = stored_name(name_format, &base, &now, encrypted)?;
    info!("Backing up {}", path.display());

    info!("Compressing...");
    let mut data = archive::pack(path)?;

    if let Some(password) = password {
        info!("Encrypting...");
        data = crypto::encrypt_with_params(&data, password, kdf)?;
    }

    info!("Uploading {name} to {}...", backend.location());
    backend.upload(&name, &data)?;
    info!("Upload completed: {name} ({} bytes)", data.len());

    Ok(BackupOutcome {
        stored_name: name,
        size: data.len(),
        encrypted,
    })
}
