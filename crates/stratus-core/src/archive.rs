//! Gzip-compressed tar archives of a single file or directory tree.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Archive, Builder};

use crate::error::{Result, StratusError};

/// Base name an archive of `path` is stored under. `.` and relative paths
/// are resolved first, so the current directory archives under its real name.
pub fn base_name(path: &Path) -> Result<String> {
    let resolved = fs::canonicalize(path).map_err(|e| {
        StratusError::Archive(format!("cannot resolve '{}': {e}", path.display()))
    })?;
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| {
            StratusError::Archive(format!("'{}' has no base name", resolved.display()))
        })
}

/// Pack `path` (file or directory) into a tar.gz held in memory. Entries are
/// rooted at the base name of `path`.
pub fn pack(path: &Path) -> Result<Vec<u8>> {
    let arcname = PathBuf::from(base_name(path)?);
    let meta = fs::metadata(path)?;

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = Builder::new(encoder);
    builder.follow_symlinks(false);

    let added = if meta.is_dir() {
        builder.append_dir_all(&arcname, path)
    } else {
        builder.append_path_with_name(path, &arcname)
    };
    added.map_err(|e| StratusError::Archive(format!("adding '{}': {e}", path.display())))?;

    let data = builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .map_err(|e| StratusError::Archive(format!("finishing archive: {e}")))?;
    Ok(data)
}

/// Extract a tar.gz stream into `dest`. Entries escaping `dest` are skipped
/// by the tar reader.
pub fn unpack<R: Read>(reader: R, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;
    let mut archive = Archive::new(GzDecoder::new(reader));
    archive.set_preserve_permissions(true);
    archive
        .unpack(dest)
        .map_err(|e| StratusError::Archive(format!("extracting into '{}': {e}", dest.display())))
}

/// Entry paths of a tar.gz stream, in archive order.
pub fn entries<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut archive = Archive::new(GzDecoder::new(reader));
    let mut names = Vec::new();
    for entry in archive
        .entries()
        .map_err(|e| StratusError::Archive(format!("reading archive: {e}")))?
    {
        let entry = entry.map_err(|e| StratusError::Archive(format!("reading entry: {e}")))?;
        let path = entry
            .path()
            .map_err(|e| StratusError::Archive(format!("invalid entry path: {e}")))?;
        names.push(path.to_string_lossy().to_string());
    }
    Ok(names)
}
