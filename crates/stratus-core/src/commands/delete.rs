use tracing::info;

use crate::backend::BackupBackend;
use crate::error::Result;

use super::select_latest;

/// Run `stratus delete`. Returns the deleted name, `None` if nothing matched.
pub fn run(backend: &dyn BackupBackend, prefix: &str) -> Result<Option<String>> {
    let Some(name) = select_latest(backend, prefix)? else {
        info!("No file matched.");
        return Ok(None);
    };
    info!("Deleting {name}");
    backend.delete(&name)?;
    Ok(Some(name))
}
