use tracing::info;

use crate::backend::BackupBackend;
use crate::error::Result;

/// Run `stratus list`: every stored name, sorted.
pub fn run(backend: &dyn BackupBackend) -> Result<Vec<String>> {
    info!("{}", backend.location());
    let mut names = backend.list()?;
    names.sort();
    Ok(names)
}
