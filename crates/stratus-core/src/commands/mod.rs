pub mod backup;
pub mod checksum;
pub mod delete;
pub mod list;
pub mod restore;

use crate::backend::BackupBackend;
use crate::error::{Result, StratusError};
use crate::naming::latest_matching;

/// Most recent stored name starting with `prefix`. An empty prefix would
/// match every archive, so it is refused before anything is listed.
pub fn select_latest(backend: &dyn BackupBackend, prefix: &str) -> Result<Option<String>> {
    if prefix.trim().is_empty() {
        return Err(StratusError::Config(
            "no archive name given, use -f to specify one".into(),
        ));
    }
    let names = backend.list()?;
    Ok(latest_matching(&names, prefix).map(str::to_string))
}
