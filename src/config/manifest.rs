use crate::error::{Result, ScriptsError};
use crate::project_identity::{MANIFEST_FILE_NAME, SRC_DIR_NAME, STATIC_DIR_NAME};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppType {
    #[default]
    Web,
    Rest,
    Widget,
}

impl AppType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "web" | "webapp" => Some(AppType::Web),
            "rest" | "restapp" => Some(AppType::Rest),
            "widget" => Some(AppType::Widget),
            _ => None,
        }
    }

    /// Web apps and widgets render in the browser and may ship a client bundle
    pub fn has_client(self) -> bool {
        matches!(self, AppType::Web | AppType::Widget)
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppType::Web => "WebApp",
            AppType::Rest => "RESTApp",
            AppType::Widget => "Widget",
        };
        f.write_str(name)
    }
}

impl<'de> Deserialize<'de> for AppType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        AppType::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown app type '{}' (expected WebApp, RESTApp or Widget)",
                raw
            ))
        })
    }
}

/// Identity of the add-on being built, as authored by the developer.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(rename = "type", default)]
    pub app_type: AppType,
    #[serde(default)]
    pub bundled: bool,
}

/// A manifest together with the file it was read from
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub manifest: Manifest,
    pub path: PathBuf,
}

/// Candidate manifest locations, current layout first, then legacy ones.
pub fn manifest_candidates(root: &Path) -> Vec<PathBuf> {
    vec![
        root.join(MANIFEST_FILE_NAME),
        root.join(STATIC_DIR_NAME).join(MANIFEST_FILE_NAME),
        root.join(SRC_DIR_NAME).join(MANIFEST_FILE_NAME),
    ]
}

/// Probe the candidates in order and return the first manifest that parses.
///
/// When none do, the error lists every path tried and why it was rejected.
pub fn load_manifest(root: &Path) -> Result<LoadedManifest> {
    let mut attempted = Vec::new();

    for path in manifest_candidates(root) {
        match read_manifest(&path) {
            Ok(manifest) => return Ok(LoadedManifest { manifest, path }),
            Err(reason) => attempted.push((path, reason)),
        }
    }

    Err(ScriptsError::ManifestNotFound { attempted })
}

fn read_manifest(path: &Path) -> std::result::Result<Manifest, String> {
    if !path.is_file() {
        return Err("not found".to_string());
    }
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let manifest: Manifest = serde_json::from_str(&content).map_err(|e| e.to_string())?;
    if manifest.id.trim().is_empty() {
        return Err("'id' is empty".to_string());
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests;
