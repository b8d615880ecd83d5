use crate::error::{Result, ScriptsError};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ScriptsError + '_ {
    move |source| ScriptsError::IoError {
        path: path.to_path_buf(),
        source,
    }
}

/// Copy everything below `src` into `dst`, keeping relative paths.
///
/// Existing files in `dst` are overwritten. Returns the number of files copied.
pub fn copy_dir_contents(src: &Path, dst: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| ScriptsError::Other(format!("Failed to walk {}: {}", src.display(), e)))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| ScriptsError::PathError(e.to_string()))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(io_err(&target))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(io_err(parent))?;
            }
            fs::copy(entry.path(), &target).map_err(io_err(entry.path()))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Files below `root`, relative to it, sorted for stable archives
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| ScriptsError::Other(format!("Failed to walk {}: {}", root.display(), e)))?;
        if entry.file_type().is_file() {
            let rel = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| ScriptsError::PathError(e.to_string()))?;
            files.push(rel.to_path_buf());
        }
    }
    Ok(files)
}

pub fn is_populated_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

pub fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(path).map_err(io_err(path))?;
    Ok(true)
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(io_err(path))
}
