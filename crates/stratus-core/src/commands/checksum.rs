use tracing::info;

use crate::backend::BackupBackend;
use crate::error::Result;

use super::select_latest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumEntry {
    pub name: String,
    /// `None` when the store reports no checksum.
    pub checksum: Option<String>,
}

/// Run `stratus checksum` against the most recent match for `prefix`.
pub fn run(backend: &dyn BackupBackend, prefix: &str) -> Result<Option<ChecksumEntry>> {
    let Some(name) = select_latest(backend, prefix)? else {
        info!("No file matched.");
        return Ok(None);
    };
    let checksum = backend.checksum(&name)?;
    Ok(Some(ChecksumEntry { name, checksum }))
}
