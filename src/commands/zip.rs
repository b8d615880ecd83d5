//! `zip`: archive the build directory into `dist/{appId}.zip`.

use super::Context;
use crate::config::load_manifest;
use crate::error::{Result, ScriptsError};
use crate::project_identity::{MANIFEST_FILE_NAME, cli_with, zip_file_name};
use crate::ui as output;
use crate::utils::fs::{ensure_dir, is_populated_dir, list_files};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

pub fn run(ctx: &Context) -> Result<PathBuf> {
    let build_dir = ctx.build_dir();
    if !is_populated_dir(&build_dir) {
        return Err(ScriptsError::ArtifactMissing {
            what: "Build output".to_string(),
            path: build_dir,
            hint: format!("Run '{}' first.", cli_with("build")),
        });
    }

    let loaded = load_manifest(&ctx.root)?;
    let app_id = ctx.env.full_app_id(&loaded.manifest.id);
    if app_id != loaded.manifest.id {
        output::info(&format!("Using app id {}", app_id));
        rewrite_manifest_id(&build_dir.join(MANIFEST_FILE_NAME), &app_id)?;
    }

    let dist_dir = ctx.dist_dir();
    ensure_dir(&dist_dir)?;
    let archive = dist_dir.join(zip_file_name(&app_id));
    let count = create_archive(&build_dir, &archive)?;

    output::success(&format!(
        "Created {} ({} files)",
        archive.strip_prefix(&ctx.root).unwrap_or(&archive).display(),
        count
    ));
    Ok(archive)
}

/// Point the manifest copy inside the build directory at `app_id`.
///
/// The authored manifest is left alone. A build without a manifest copy is
/// archived as is.
pub fn rewrite_manifest_id(manifest: &Path, app_id: &str) -> Result<bool> {
    if !manifest.exists() {
        return Ok(false);
    }
    let content = fs::read_to_string(manifest).map_err(|e| ScriptsError::IoError {
        path: manifest.to_path_buf(),
        source: e,
    })?;
    let mut json: Value = serde_json::from_str(&content).map_err(|e| ScriptsError::ParseError {
        file: manifest.display().to_string(),
        message: e.to_string(),
    })?;
    let Some(object) = json.as_object_mut() else {
        return Err(ScriptsError::ParseError {
            file: manifest.display().to_string(),
            message: "expected a JSON object".to_string(),
        });
    };
    object.insert("id".to_string(), Value::String(app_id.to_string()));

    let rendered = serde_json::to_string_pretty(&json)?;
    fs::write(manifest, rendered).map_err(|e| ScriptsError::IoError {
        path: manifest.to_path_buf(),
        source: e,
    })?;
    Ok(true)
}

/// Deflate every file below `source` into `archive`, paths relative to `source`.
pub fn create_archive(source: &Path, archive: &Path) -> Result<usize> {
    let files = list_files(source)?;
    let file = File::create(archive).map_err(|e| ScriptsError::IoError {
        path: archive.to_path_buf(),
        source: e,
    })?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for rel in &files {
        // Archive entries always use forward slashes
        let name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        writer.start_file(name, options)?;

        let path = source.join(rel);
        let mut input = File::open(&path).map_err(|e| ScriptsError::IoError {
            path: path.clone(),
            source: e,
        })?;
        io::copy(&mut input, &mut writer).map_err(|e| ScriptsError::IoError {
            path: path.clone(),
            source: e,
        })?;
    }

    writer.finish()?;
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, environment};
    use std::io::Read;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn built_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "manifest.json",
            r#"{"id":"my-app","type":"WebApp","bundled":true}"#,
        );
        write(
            dir.path(),
            "build/manifest.json",
            r#"{"id":"my-app","type":"WebApp","bundled":true}"#,
        );
        write(dir.path(), "build/index.js", "module.exports = {};");
        write(dir.path(), "build/resource/chunk-a.js", "chunk");
        dir
    }

    fn entry_names(archive: &Path) -> Vec<String> {
        let file = File::open(archive).unwrap();
        let zip = zip::ZipArchive::new(file).unwrap();
        let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[test]
    fn archives_build_dir_under_manifest_id() {
        let dir = built_project();
        let ctx = Context::new(dir.path(), Environment::isolated());

        let archive = run(&ctx).unwrap();

        assert_eq!(archive, dir.path().join("dist/my-app.zip"));
        assert_eq!(
            entry_names(&archive),
            vec!["index.js", "manifest.json", "resource/chunk-a.js"]
        );
    }

    #[test]
    fn prefixed_id_names_archive_and_rewrites_build_manifest_only() {
        let dir = built_project();
        let env = Environment::isolated()
            .with(environment::APP_ID_PREFIX, "pre-")
            .with(environment::APP_ID_SUFFIX, "-v2");
        let ctx = Context::new(dir.path(), env);

        let archive = run(&ctx).unwrap();
        assert_eq!(archive, dir.path().join("dist/pre-my-app-v2.zip"));

        let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let mut manifest = String::new();
        zip.by_name("manifest.json")
            .unwrap()
            .read_to_string(&mut manifest)
            .unwrap();
        let json: Value = serde_json::from_str(&manifest).unwrap();
        assert_eq!(json["id"], "pre-my-app-v2");

        let authored = fs::read_to_string(dir.path().join("manifest.json")).unwrap();
        assert!(authored.contains(r#""id":"my-app""#));
    }

    #[test]
    fn missing_build_output_is_reported() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "manifest.json", r#"{"id":"my-app"}"#);
        let ctx = Context::new(dir.path(), Environment::isolated());

        let err = run(&ctx).unwrap_err();
        assert!(matches!(err, ScriptsError::ArtifactMissing { .. }));
        assert!(!dir.path().join("dist").exists());
    }
}
