//! Retention manager: back up matching files from a spool directory, then
//! move them to a purgatory directory (or delete or keep them), and purge
//! purgatory files older than the configured age.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use filetime::FileTime;
use globset::{Glob, GlobMatcher};
use tracing::{debug, info, warn};

use crate::backend::BackupBackend;
use crate::commands::backup;
use crate::config::{expand_tilde, parse_human_duration, ManagerConfig, PostBackupAction};
use crate::crypto::KdfParams;
use crate::error::{Result, StratusError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManageReport {
    pub backed_up: usize,
    pub failed: usize,
    pub moved: usize,
    pub deleted: usize,
    pub purged: usize,
}

/// Settings a run needs besides the manager section itself.
pub struct ManageContext<'a> {
    pub backend: &'a dyn BackupBackend,
    pub name_format: &'a str,
    pub password: Option<&'a str>,
    pub kdf: KdfParams,
    pub now: DateTime<Local>,
}

/// Run `stratus manage run`.
pub fn run(config: &ManagerConfig, ctx: &ManageContext<'_>) -> Result<ManageReport> {
    let mut report = ManageReport::default();

    if !config.enabled {
        warn!("manager is disabled; set 'manager.enabled: true' to run it");
        return Ok(report);
    }
    let Some(source_dir) = config.source_dir.as_deref().map(expand_tilde) else {
        warn!("manager.source_dir is not set; nothing to do");
        return Ok(report);
    };
    let source_dir = PathBuf::from(source_dir);
    if !source_dir.is_dir() {
        warn!("source directory {} does not exist", source_dir.display());
        return Ok(report);
    }

    let purgatory = match config.post_backup_action {
        PostBackupAction::Purgatory => Some(purgatory_dir(config)?),
        _ => None,
    };
    let max_age = parse_human_duration(&config.purge_after)?;
    let matcher = Glob::new(&config.pattern)
        .map_err(|e| StratusError::Config(format!("invalid manager.pattern: {e}")))?
        .compile_matcher();

    for file in matching_files(&source_dir, &matcher)? {
        match backup::run_with(
            ctx.backend,
            &file,
            ctx.name_format,
            ctx.password,
            ctx.kdf,
            ctx.now,
        ) {
            Ok(outcome) => {
                report.backed_up += 1;
                debug!("{} stored as {}", file.display(), outcome.stored_name);
            }
            Err(e) => {
                report.failed += 1;
                warn!("backup of {} failed, leaving it in place: {e}", file.display());
                continue;
            }
        }

        match (config.post_backup_action, purgatory.as_deref()) {
            (PostBackupAction::Purgatory, Some(dir)) => {
                move_to_purgatory(&file, dir)?;
                report.moved += 1;
            }
            (PostBackupAction::Delete, _) => {
                fs::remove_file(&file)?;
                report.deleted += 1;
            }
            _ => {}
        }
    }

    if let Some(dir) = purgatory.as_deref() {
        report.purged = purge_older_than(dir, max_age, SystemTime::from(ctx.now))?;
    }

    info!(
        "manager: {} backed up, {} failed, {} moved, {} deleted, {} purged",
        report.backed_up, report.failed, report.moved, report.deleted, report.purged
    );
    Ok(report)
}

fn purgatory_dir(config: &ManagerConfig) -> Result<PathBuf> {
    let dir = config.purgatory_dir.as_deref().ok_or_else(|| {
        StratusError::Config("manager.purgatory_dir is required for 'purgatory'".into())
    })?;
    let dir = PathBuf::from(expand_tilde(dir));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Regular files directly inside `dir` whose names match, sorted by name.
fn matching_files(dir: &Path, matcher: &GlobMatcher) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if matcher.is_match(entry.file_name()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Move `file` into `dir` and stamp it with the current time, so the purge
/// age counts from when it entered purgatory.
fn move_to_purgatory(file: &Path, dir: &Path) -> Result<PathBuf> {
    let name = file
        .file_name()
        .ok_or_else(|| StratusError::Other(format!("'{}' has no file name", file.display())))?;
    let target = dir.join(name);
    if fs::rename(file, &target).is_err() {
        // Different filesystem.
        fs::copy(file, &target)?;
        fs::remove_file(file)?;
    }
    filetime::set_file_mtime(&target, FileTime::now())?;
    debug!("moved {} to {}", file.display(), target.display());
    Ok(target)
}

/// Delete regular files in `dir` whose modification time is at least
/// `max_age` before `now`. Returns the number deleted.
pub fn purge_older_than(dir: &Path, max_age: Duration, now: SystemTime) -> Result<usize> {
    let mut purged = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        let age = now
            .duration_since(meta.modified()?)
            .unwrap_or(Duration::ZERO);
        if age >= max_age {
            fs::remove_file(entry.path())?;
            debug!("purged {}", entry.path().display());
            purged += 1;
        }
    }
    Ok(purged)
}
