//! Populating the build directory, and the composite `build` command.

use super::Context;
use crate::bundler::{
    BuildMode, BundleTarget, LoaderOptions, ProjectLayout, Webpack, relocate_chunks, select_targets,
};
use crate::config::{DevProperties, LoadedManifest, PackageProperties, load_manifest, resolve_transpile};
use crate::error::{Result, ScriptsError};
use crate::pipeline::{self, DeployMode, Step, StepRunner, check_status};
use crate::project_identity::MANIFEST_FILE_NAME;
use crate::ui as output;
use crate::utils::fs::{copy_dir_contents, ensure_dir, remove_dir_if_exists};
use crate::utils::platform::{display_command, npx_command};
use std::fs;

/// Start from an empty build directory
fn reset_build_dir(ctx: &Context) -> Result<()> {
    let build_dir = ctx.build_dir();
    remove_dir_if_exists(&build_dir)?;
    ensure_dir(&build_dir)
}

fn copy_static(ctx: &Context) -> Result<usize> {
    let static_dir = ctx.static_dir();
    if !static_dir.is_dir() {
        return Ok(0);
    }
    copy_dir_contents(&static_dir, &ctx.build_dir())
}

/// Bundled apps keep the manifest at the project root; make sure it ships.
fn ensure_manifest_in_build(ctx: &Context, loaded: &LoadedManifest) -> Result<()> {
    let dest = ctx.build_dir().join(MANIFEST_FILE_NAME);
    if dest.exists() {
        return Ok(());
    }
    fs::copy(&loaded.path, &dest).map_err(|e| ScriptsError::IoError {
        path: loaded.path.clone(),
        source: e,
    })?;
    Ok(())
}

/// Manifest and bundle targets of a bundled project.
///
/// Targets are selected before anything is written, so a missing entry
/// leaves the previous build directory untouched.
pub fn bundle_targets(ctx: &Context) -> Result<(LoadedManifest, Vec<BundleTarget>)> {
    let loaded = load_manifest(&ctx.root)?;
    let package = PackageProperties::load(&ctx.root)?;
    let layout = ProjectLayout::new(&ctx.root);
    let options = LoaderOptions {
        transpile_packages: package.transpile_packages,
    };
    let targets = select_targets(loaded.manifest.app_type, &layout, &options)?;

    for target in &targets {
        let entry = target
            .entry
            .strip_prefix(&ctx.root)
            .unwrap_or(&target.entry)
            .display()
            .to_string();
        output::indent(&format!("{} → {}", entry, target.output_file), 1);
    }
    Ok((loaded, targets))
}

/// Empty `build/` holding `static/` and the manifest, ready for the bundler
pub fn prepare_bundle_dir(ctx: &Context, loaded: &LoadedManifest) -> Result<()> {
    reset_build_dir(ctx)?;
    copy_static(ctx)?;
    ensure_manifest_in_build(ctx, loaded)
}

/// Move chunks after a successful compilation
pub fn finish_bundle(ctx: &Context) -> Result<()> {
    let moved = relocate_chunks(&ctx.build_dir())?;
    if !moved.is_empty() {
        output::verbose(&format!("Moved {} chunk(s) into resource/", moved.len()));
    }
    Ok(())
}

/// Bundled build: select targets, run webpack, move chunks into `resource/`.
pub fn run_bundle(ctx: &Context, mode: BuildMode) -> Result<()> {
    output::header(&format!("Bundling ({})", mode.as_str()));
    let (loaded, targets) = bundle_targets(ctx)?;

    prepare_bundle_dir(ctx, &loaded)?;
    Webpack::new(&ctx.root).build(&targets, mode)?;
    finish_bundle(ctx)?;

    output::success(&format!("Bundled {}", loaded.manifest.id));
    Ok(())
}

/// Legacy build without transpiling: `static/` and `src/` copied verbatim.
pub fn run_copy(ctx: &Context) -> Result<()> {
    let src_dir = ctx.src_dir();
    let static_dir = ctx.static_dir();
    if !src_dir.is_dir() && !static_dir.is_dir() {
        return Err(ScriptsError::ArtifactMissing {
            what: "Source directory".to_string(),
            path: src_dir,
            hint: "Expected a src/ or static/ directory.".to_string(),
        });
    }

    reset_build_dir(ctx)?;
    let mut copied = copy_static(ctx)?;
    if src_dir.is_dir() {
        copied += copy_dir_contents(&src_dir, &ctx.build_dir())?;
    }
    output::success(&format!("Copied {} file(s) into build/", copied));
    Ok(())
}

/// Legacy build with babel: `src/` transpiled into `build/`, `static/` copied.
pub fn run_transpile(ctx: &Context) -> Result<()> {
    let src_dir = ctx.src_dir();
    if !src_dir.is_dir() {
        return Err(ScriptsError::ArtifactMissing {
            what: "Source directory".to_string(),
            path: src_dir,
            hint: "Nothing to transpile.".to_string(),
        });
    }

    reset_build_dir(ctx)?;

    let mut cmd = npx_command(
        "babel",
        &[
            crate::project_identity::SRC_DIR_NAME.to_string(),
            "--out-dir".to_string(),
            ctx.build_dir().to_string_lossy().into_owned(),
            "--copy-files".to_string(),
        ],
        &ctx.root,
    )?;
    output::verbose(&format!("Running {}", display_command(&cmd)));
    let status = cmd.status().map_err(|e| ScriptsError::SystemCommandFailed {
        command: display_command(&cmd),
        reason: e.to_string(),
    })?;
    check_status("babel", status)?;
    copy_static(ctx)?;

    output::success("Transpile complete");
    Ok(())
}

pub fn run_cleanup(ctx: &Context) -> Result<()> {
    if remove_dir_if_exists(&ctx.build_dir())? {
        output::verbose("Removed build/");
    }
    Ok(())
}

/// Steps of the composite build for the project in `ctx`.
pub fn plan(ctx: &Context, deploy: Option<DeployMode>) -> Result<Vec<Step>> {
    let loaded = load_manifest(&ctx.root)?;
    let transpile = if loaded.manifest.bundled {
        false
    } else {
        let package = PackageProperties::load(&ctx.root)?;
        let dev = DevProperties::load(&ctx.root)?;
        resolve_transpile(&package, dev.as_ref())
    };
    Ok(pipeline::build_plan(loaded.manifest.bundled, transpile, deploy))
}

/// `build [deploy|force-deploy]`
pub fn run(ctx: &Context, deploy: Option<DeployMode>, runner: &mut dyn StepRunner) -> Result<()> {
    let steps = plan(ctx, deploy)?;
    let names: Vec<&str> = steps.iter().map(Step::name).collect();
    output::verbose(&format!("Build plan: {}", names.join(" → ")));
    pipeline::run_sequence(runner, &steps)
}
