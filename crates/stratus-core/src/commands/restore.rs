use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::info;
use zeroize::Zeroizing;

use stratus_storage::JobDescription;

use crate::archive;
use crate::backend::{BackupBackend, Retrieval};
use crate::crypto;
use crate::error::{Result, StratusError};
use crate::naming::is_encrypted;

use super::select_latest;

#[derive(Debug)]
pub enum RestoreOutcome {
    NoMatch,
    /// Glacier retrieval still running; run the command again later.
    Pending {
        name: String,
        job: JobDescription,
    },
    Restored {
        name: String,
        dest: PathBuf,
    },
}

/// Run `stratus restore`.
///
/// `password` is only consulted when the selected archive is encrypted, and
/// then before the download starts.
pub fn run<F>(
    backend: &dyn BackupBackend,
    prefix: &str,
    dest: &Path,
    password: F,
) -> Result<RestoreOutcome>
where
    F: FnOnce() -> Result<Option<Zeroizing<String>>>,
{
    let Some(name) = select_latest(backend, prefix)? else {
        info!("No file matched.");
        return Ok(RestoreOutcome::NoMatch);
    };
    info!("Restoring {name}");

    let password = if is_encrypted(&name) {
        Some(password()?.ok_or_else(|| {
            StratusError::Config(format!("'{name}' is encrypted and no password was given"))
        })?)
    } else {
        None
    };

    info!("Downloading...");
    let mut reader = match backend.download(&name)? {
        Retrieval::Ready(cursor) => cursor,
        Retrieval::Pending(job) => {
            info!("Not completed yet");
            return Ok(RestoreOutcome::Pending { name, job });
        }
        Retrieval::Missing => {
            info!("No file matched.");
            return Ok(RestoreOutcome::NoMatch);
        }
    };

    if let Some(password) = password {
        let mut sealed = Vec::new();
        reader.read_to_end(&mut sealed)?;
        info!("Decrypting...");
        let plain = crypto::decrypt(&sealed, &password)?;
        info!("Uncompressing...");
        archive::unpack(&plain[..], dest)?;
    } else {
        info!("Uncompressing...");
        archive::unpack(reader, dest)?;
    }

    info!("Restored {name} into {}", dest.display());
    Ok(RestoreOutcome::Restored {
        name,
        dest: dest.to_path_buf(),
    })
}
