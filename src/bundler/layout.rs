//! Post-processing of bundler output.
//!
//! The add-on runtime only serves static files from `resource/`, so split
//! chunks emitted next to the bundles are moved there.

use crate::error::{Result, ScriptsError};
use crate::project_identity::RESOURCE_DIR_NAME;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static CHUNK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^chunk-").expect("Valid regex pattern"));

pub fn is_chunk_file(name: &str) -> bool {
    CHUNK_PATTERN.is_match(name)
}

/// Move top-level `chunk-*` files of `build_dir` into `build_dir/resource/`.
///
/// An existing file with the same name in `resource/` is replaced. Running
/// this twice leaves the same layout. Returns the new paths.
pub fn relocate_chunks(build_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(build_dir).map_err(|e| ScriptsError::IoError {
        path: build_dir.to_path_buf(),
        source: e,
    })?;

    let mut chunks: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if is_chunk_file(&entry.file_name().to_string_lossy()) {
            chunks.push(entry.path());
        }
    }

    if chunks.is_empty() {
        return Ok(Vec::new());
    }
    chunks.sort();

    let resource_dir = build_dir.join(RESOURCE_DIR_NAME);
    fs::create_dir_all(&resource_dir).map_err(|e| ScriptsError::IoError {
        path: resource_dir.clone(),
        source: e,
    })?;

    let mut moved = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let Some(name) = chunk.file_name() else {
            continue;
        };
        let dest = resource_dir.join(name);
        if dest.exists() {
            fs::remove_file(&dest).map_err(|e| ScriptsError::IoError {
                path: dest.clone(),
                source: e,
            })?;
        }
        fs::rename(&chunk, &dest).map_err(|e| ScriptsError::IoError {
            path: chunk.clone(),
            source: e,
        })?;
        moved.push(dest);
    }

    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn moves_only_chunk_files() {
        let dir = TempDir::new().unwrap();
        let build = dir.path();
        fs::write(build.join("chunk-foo.js"), "chunk").unwrap();
        fs::write(build.join("bar.js"), "bar").unwrap();

        let moved = relocate_chunks(build).unwrap();

        assert_eq!(moved, vec![build.join("resource/chunk-foo.js")]);
        assert!(build.join("resource/chunk-foo.js").is_file());
        assert!(!build.join("chunk-foo.js").exists());
        assert!(build.join("bar.js").is_file());
        assert!(!build.join("resource/bar.js").exists());
    }

    #[test]
    fn second_run_keeps_the_same_layout() {
        let dir = TempDir::new().unwrap();
        let build = dir.path();
        fs::write(build.join("chunk-foo.js"), "chunk").unwrap();
        fs::write(build.join("bar.js"), "bar").unwrap();

        relocate_chunks(build).unwrap();
        let moved = relocate_chunks(build).unwrap();

        assert!(moved.is_empty());
        assert_eq!(
            fs::read_to_string(build.join("resource/chunk-foo.js")).unwrap(),
            "chunk"
        );
        assert!(build.join("bar.js").is_file());
    }

    #[test]
    fn rebuilt_chunk_overwrites_previous_copy() {
        let dir = TempDir::new().unwrap();
        let build = dir.path();
        fs::create_dir_all(build.join("resource")).unwrap();
        fs::write(build.join("resource/chunk-foo.js"), "old").unwrap();
        fs::write(build.join("chunk-foo.js"), "new").unwrap();

        relocate_chunks(build).unwrap();

        assert_eq!(
            fs::read_to_string(build.join("resource/chunk-foo.js")).unwrap(),
            "new"
        );
    }

    #[test]
    fn no_chunks_leaves_resource_dir_alone() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.js"), "").unwrap();
        assert!(relocate_chunks(dir.path()).unwrap().is_empty());
        assert!(!dir.path().join("resource").exists());
    }

    #[test]
    fn chunk_pattern_is_anchored() {
        assert!(is_chunk_file("chunk-vendors.js"));
        assert!(is_chunk_file("chunk-1a2b.css"));
        assert!(!is_chunk_file("mychunk-foo.js"));
        assert!(!is_chunk_file("chunk.js"));
    }
}
