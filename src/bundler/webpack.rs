//! webpack driver.
//!
//! Bundle targets are rendered into a generated config module and webpack is
//! run through npx against it, once for builds and in `--watch` mode for the
//! dev loop.

use crate::bundler::rules::{LoaderRule, RuleAction};
use crate::bundler::targets::{BundleTarget, OutputFormat};
use crate::bundler::watch::BuildWatch;
use crate::error::{Result, ScriptsError};
use crate::project_identity::{WEBPACK_CONFIG_DIR, WEBPACK_CONFIG_FILE_NAME};
use crate::ui as output;
use crate::utils::platform::{display_command, npx_command};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Production,
    Development,
}

impl BuildMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Production => "production",
            BuildMode::Development => "development",
        }
    }
}

fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

fn js_path(path: &Path) -> String {
    js_string(&path.to_string_lossy())
}

fn render_rule(rule: &LoaderRule) -> String {
    let mut fields = vec![format!("test: new RegExp({})", js_string(&rule.test))];

    if !rule.include.is_empty() {
        let include: Vec<String> = rule.include.iter().map(|p| js_path(p)).collect();
        fields.push(format!("include: [{}]", include.join(", ")));
    }

    match &rule.action {
        RuleAction::Use(loaders) => {
            let uses: Vec<String> = loaders
                .iter()
                .map(|loader| match &loader.options {
                    Some(options) => format!(
                        "{{ loader: {}, options: {} }}",
                        js_string(&loader.name),
                        options
                    ),
                    None => format!("{{ loader: {} }}", js_string(&loader.name)),
                })
                .collect();
            fields.push(format!("use: [{}]", uses.join(", ")));
        }
        RuleAction::AssetResource { filename } => {
            fields.push("type: \"asset/resource\"".to_string());
            fields.push(format!("generator: {{ filename: {} }}", js_string(filename)));
        }
        RuleAction::AssetSource => fields.push("type: \"asset/source\"".to_string()),
    }

    format!("{{ {} }}", fields.join(", "))
}

fn render_target(target: &BundleTarget, mode: BuildMode) -> String {
    // dev rebuilds reuse build/, so their chunk names must stay stable
    let client_chunks = match mode {
        BuildMode::Production => "chunk-[name]-[contenthash].js",
        BuildMode::Development => "chunk-[name].js",
    };
    let (webpack_target, output_extra, optimization) = match target.format {
        OutputFormat::CommonJs => (
            "[\"web\", \"es5\"]",
            "chunkFilename: \"chunk-[name].js\", library: { type: \"commonjs2\" }".to_string(),
            None,
        ),
        OutputFormat::Browser => (
            "\"web\"",
            format!(
                "chunkFilename: {}, publicPath: \"auto\"",
                js_string(client_chunks)
            ),
            None,
        ),
        OutputFormat::Iife => (
            "[\"web\", \"es5\"]",
            "iife: true".to_string(),
            Some("optimization: { splitChunks: false, runtimeChunk: false }"),
        ),
    };

    let devtool = match mode {
        BuildMode::Production => "false",
        BuildMode::Development => "\"inline-source-map\"",
    };

    let rules: Vec<String> = target.rules.iter().map(render_rule).collect();

    let mut lines = vec![
        format!("    name: {},", js_string(target.kind.name())),
        format!("    mode: {},", js_string(mode.as_str())),
        format!("    target: {},", webpack_target),
        format!("    devtool: {},", devtool),
        format!("    entry: {},", js_path(&target.entry)),
        format!(
            "    output: {{ path: {}, filename: {}, {} }},",
            js_path(&target.output_dir),
            js_string(&target.output_file),
            output_extra
        ),
        "    resolve: { extensions: [\".js\", \".jsx\", \".ts\", \".tsx\", \".json\"] },".to_string(),
        format!("    module: {{ rules: [\n      {}\n    ] }},", rules.join(",\n      ")),
    ];
    if let Some(optimization) = optimization {
        lines.push(format!("    {},", optimization));
    }

    format!("  {{\n{}\n  }}", lines.join("\n"))
}

/// Render the targets as a webpack multi-compiler config module.
pub fn render_config(targets: &[BundleTarget], mode: BuildMode) -> String {
    let rendered: Vec<String> = targets.iter().map(|t| render_target(t, mode)).collect();
    format!(
        "// Generated by {}. Changes are overwritten on every build.\nmodule.exports = [\n{}\n];\n",
        crate::project_identity::BINARY_NAME,
        rendered.join(",\n")
    )
}

pub struct Webpack {
    root: PathBuf,
}

impl Webpack {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn write_config(&self, targets: &[BundleTarget], mode: BuildMode) -> Result<PathBuf> {
        let dir = self.root.join(WEBPACK_CONFIG_DIR);
        fs::create_dir_all(&dir).map_err(|e| ScriptsError::IoError {
            path: dir.clone(),
            source: e,
        })?;
        let path = dir.join(WEBPACK_CONFIG_FILE_NAME);
        fs::write(&path, render_config(targets, mode)).map_err(|e| ScriptsError::IoError {
            path: path.clone(),
            source: e,
        })?;
        output::verbose(&format!("Wrote webpack config to {}", path.display()));
        Ok(path)
    }

    /// One-shot build of every target. Bundler errors are printed by webpack
    /// itself; the build directory is left as webpack left it.
    pub fn build(&self, targets: &[BundleTarget], mode: BuildMode) -> Result<()> {
        let config = self.write_config(targets, mode)?;
        let mut cmd = npx_command(
            "webpack",
            &["--config".to_string(), config.to_string_lossy().into_owned()],
            &self.root,
        )?;
        output::verbose(&format!("Running {}", display_command(&cmd)));

        let status = cmd.status().map_err(|e| ScriptsError::SystemCommandFailed {
            command: display_command(&cmd),
            reason: e.to_string(),
        })?;
        if !status.success() {
            return Err(ScriptsError::BundlerFailed);
        }
        Ok(())
    }

    /// Start webpack in watch mode and subscribe to its compilations.
    pub fn watch(&self, targets: &[BundleTarget]) -> Result<BuildWatch> {
        let config = self.write_config(targets, BuildMode::Development)?;
        let cmd = npx_command(
            "webpack",
            &[
                "--config".to_string(),
                config.to_string_lossy().into_owned(),
                "--watch".to_string(),
                "--no-color".to_string(),
            ],
            &self.root,
        )?;
        output::verbose(&format!("Running {}", display_command(&cmd)));
        BuildWatch::spawn(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::rules::LoaderOptions;
    use crate::bundler::targets::{ProjectLayout, select_targets};
    use crate::config::AppType;
    use tempfile::TempDir;

    fn web_app_targets() -> (TempDir, Vec<BundleTarget>) {
        let dir = TempDir::new().unwrap();
        let layout = ProjectLayout::new(dir.path());
        fs::create_dir_all(&layout.src_dir).unwrap();
        for file in ["index.js", "main.js", "hooks.js"] {
            fs::write(layout.src_dir.join(file), "").unwrap();
        }
        let options = LoaderOptions {
            transpile_packages: vec!["@sitevision/api".to_string()],
        };
        let targets = select_targets(AppType::Web, &layout, &options).unwrap();
        (dir, targets)
    }

    #[test]
    fn renders_one_compiler_per_target() {
        let (_dir, targets) = web_app_targets();
        let config = render_config(&targets, BuildMode::Production);

        assert!(config.starts_with("// Generated by sitevision-scripts."));
        assert!(config.contains("name: \"server\""));
        assert!(config.contains("name: \"client\""));
        assert!(config.contains("name: \"hooks\""));
        assert!(config.contains("library: { type: \"commonjs2\" }"));
        assert!(config.contains("iife: true"));
        assert!(config.contains("mode: \"production\""));
        assert!(config.contains("devtool: false"));
    }

    #[test]
    fn renders_rules_with_escaped_regex_and_includes() {
        let (_dir, targets) = web_app_targets();
        let config = render_config(&targets, BuildMode::Development);

        assert!(config.contains(r#"test: new RegExp("\\.(js|jsx|ts|tsx)$")"#));
        assert!(config.contains("node_modules/@sitevision/api"));
        assert!(config.contains("loader: \"babel-loader\", options: {"));
        assert!(config.contains("type: \"asset/resource\""));
        assert!(config.contains("devtool: \"inline-source-map\""));
    }

    #[test]
    fn client_chunks_use_relocatable_names() {
        let (_dir, targets) = web_app_targets();
        let config = render_config(&targets, BuildMode::Production);
        assert!(config.contains("chunkFilename: \"chunk-[name]-[contenthash].js\""));
    }

    #[test]
    fn development_client_chunks_keep_stable_names() {
        let (_dir, targets) = web_app_targets();
        let config = render_config(&targets, BuildMode::Development);
        assert!(config.contains("chunkFilename: \"chunk-[name].js\", publicPath: \"auto\""));
        assert!(!config.contains("chunk-[name]-[contenthash]"));
    }
}
