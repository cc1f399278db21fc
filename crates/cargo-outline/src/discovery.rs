//! Locating feature documents on disk.

use std::path::{Path, PathBuf};

use eyre::{Context, Result, bail};
use walkdir::WalkDir;

const FEATURE_EXTENSION: &str = "feature";

/// Expand `paths` into feature files.
///
/// Files are taken as given, whatever their extension. Directories are
/// walked recursively for `*.feature` files, sorted by path.
///
/// # Errors
/// Returns an error when a path does not exist or a directory cannot be
/// read.
pub(crate) fn feature_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            files.extend(walk(path)?);
        } else {
            bail!("no such feature file or directory: {}", path.display());
        }
    }
    Ok(files)
}

fn walk(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.wrap_err_with(|| format!("failed to walk {}", dir.display()))?;
        let is_feature = entry.path().extension().is_some_and(|ext| ext == FEATURE_EXTENSION);
        if entry.file_type().is_file() && is_feature {
            found.push(entry.into_path());
        }
    }
    tracing::debug!(dir = %dir.display(), count = found.len(), "discovered feature files");
    Ok(found)
}

/// Split `path` into the base directory and file name `parse_feature`
/// expects.
pub(crate) fn split(path: &Path) -> (&Path, &Path) {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => (parent, Path::new(name)),
        _ => (Path::new(""), path),
    }
}
