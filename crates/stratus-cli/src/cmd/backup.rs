use std::path::PathBuf;

use stratus_core::backend::{open_backend, BackendKind};
use stratus_core::commands;
use stratus_core::config::{expand_tilde, StratusConfig};

use crate::format::format_bytes;
use crate::password::backup_password;

pub(crate) fn run_backup(
    config: &StratusConfig,
    kind: BackendKind,
    path: &str,
    password: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = open_backend(kind, config)?;
    let path = PathBuf::from(expand_tilde(path));
    if !path.exists() {
        return Err(format!("path not found: {}", path.display()).into());
    }

    let password = backup_password(password, config)?;
    let outcome = commands::backup::run(
        backend.as_ref(),
        &path,
        &config.archive_name_format,
        password.as_deref().map(|s| s.as_str()),
    )?;

    println!(
        "Stored {} ({}{})",
        outcome.stored_name,
        format_bytes(outcome.size as u64),
        if outcome.encrypted { ", encrypted" } else { "" }
    );
    Ok(())
}
