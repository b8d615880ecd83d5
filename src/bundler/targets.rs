//! Bundle target selection.
//!
//! Decides which bundles an app needs from its type and the entry files
//! present in `src/`. Probed fresh on every invocation.

use crate::bundler::rules::{LoaderOptions, LoaderRule, loader_rules};
use crate::config::AppType;
use crate::error::{Result, ScriptsError};
use std::path::{Path, PathBuf};

/// Extensions tried for every entry, in order
pub const ENTRY_EXTENSIONS: [&str; 4] = ["js", "jsx", "ts", "tsx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Server,
    Client,
    Hooks,
    Headless,
}

impl TargetKind {
    pub fn name(self) -> &'static str {
        match self {
            TargetKind::Server => "server",
            TargetKind::Client => "client",
            TargetKind::Hooks => "hooks",
            TargetKind::Headless => "headless",
        }
    }

    pub fn entry_stem(self) -> &'static str {
        match self {
            TargetKind::Server => "index",
            TargetKind::Client => "main",
            TargetKind::Hooks => "hooks",
            TargetKind::Headless => "headless",
        }
    }

    pub fn output_file(self) -> String {
        format!("{}.js", self.entry_stem())
    }

    pub fn format(self) -> OutputFormat {
        match self {
            TargetKind::Server => OutputFormat::CommonJs,
            TargetKind::Client => OutputFormat::Browser,
            TargetKind::Hooks | TargetKind::Headless => OutputFormat::Iife,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `module.exports` consumed by the server-side runtime
    CommonJs,
    /// Browser script, may split into `chunk-*` files
    Browser,
    /// Self-contained script with no chunks
    Iife,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BundleTarget {
    pub kind: TargetKind,
    pub entry: PathBuf,
    pub output_dir: PathBuf,
    pub output_file: String,
    pub format: OutputFormat,
    pub rules: Vec<LoaderRule>,
}

/// Paths the selector works against
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub src_dir: PathBuf,
    pub build_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            src_dir: root.join(crate::project_identity::SRC_DIR_NAME),
            build_dir: root.join(crate::project_identity::BUILD_DIR_NAME),
        }
    }
}

/// First `src/<stem>.<ext>` that exists, trying [`ENTRY_EXTENSIONS`] in order.
pub fn find_entry(src_dir: &Path, stem: &str) -> Option<PathBuf> {
    ENTRY_EXTENSIONS
        .iter()
        .map(|ext| src_dir.join(format!("{}.{}", stem, ext)))
        .find(|path| path.is_file())
}

fn tried_names(stem: &str) -> Vec<String> {
    ENTRY_EXTENSIONS
        .iter()
        .map(|ext| format!("{}.{}", stem, ext))
        .collect()
}

fn target(kind: TargetKind, entry: PathBuf, layout: &ProjectLayout, options: &LoaderOptions) -> BundleTarget {
    BundleTarget {
        kind,
        entry,
        output_dir: layout.build_dir.clone(),
        output_file: kind.output_file(),
        format: kind.format(),
        rules: loader_rules(kind, &layout.src_dir, &layout.root, options),
    }
}

/// Assemble the ordered bundle targets for an app.
///
/// - `index.*` is mandatory and always yields the server bundle.
/// - Web apps and widgets get a client bundle when `main.*` exists; a
///   widget without one is an error.
/// - `hooks.*` and `headless.*` become standalone bundles for any app type.
pub fn select_targets(
    app_type: AppType,
    layout: &ProjectLayout,
    options: &LoaderOptions,
) -> Result<Vec<BundleTarget>> {
    let mut targets = Vec::new();

    let server_entry = find_entry(&layout.src_dir, TargetKind::Server.entry_stem()).ok_or_else(|| {
        ScriptsError::EntryNotFound {
            name: TargetKind::Server.entry_stem().to_string(),
            reason: "every app needs a server entry".to_string(),
            tried: tried_names(TargetKind::Server.entry_stem()),
        }
    })?;
    targets.push(target(TargetKind::Server, server_entry, layout, options));

    if app_type.has_client() {
        match find_entry(&layout.src_dir, TargetKind::Client.entry_stem()) {
            Some(entry) => targets.push(target(TargetKind::Client, entry, layout, options)),
            None if app_type == AppType::Widget => {
                return Err(ScriptsError::EntryNotFound {
                    name: TargetKind::Client.entry_stem().to_string(),
                    reason: "widgets require a client entry".to_string(),
                    tried: tried_names(TargetKind::Client.entry_stem()),
                });
            }
            None => {}
        }
    }

    for kind in [TargetKind::Hooks, TargetKind::Headless] {
        if let Some(entry) = find_entry(&layout.src_dir, kind.entry_stem()) {
            targets.push(target(kind, entry, layout, options));
        }
    }

    Ok(targets)
}

#[cfg(test)]
mod tests;
