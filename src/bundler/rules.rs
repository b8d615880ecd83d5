//! Module and asset loader rules for one bundle target.

use crate::bundler::targets::TargetKind;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Inputs to rule construction that come from project configuration.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// node_modules packages compiled by babel along with `src/`
    pub transpile_packages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loader {
    pub name: String,
    pub options: Option<Value>,
}

impl Loader {
    fn plain(name: &str) -> Self {
        Self {
            name: name.to_string(),
            options: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleAction {
    Use(Vec<Loader>),
    /// webpack asset module emitted as a separate file
    AssetResource { filename: String },
    /// webpack asset module inlined as a string
    AssetSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoaderRule {
    /// Regex source matched against module paths
    pub test: String,
    /// Directories the rule is limited to; empty means everywhere
    pub include: Vec<PathBuf>,
    pub action: RuleAction,
}

pub const SCRIPT_TEST: &str = r"\.(js|jsx|ts|tsx)$";
pub const STYLE_TEST: &str = r"\.(css|scss)$";
pub const ASSET_TEST: &str = r"\.(png|jpe?g|gif|svg|webp|woff2?|ttf|eot)$";
pub const TEMPLATE_TEST: &str = r"\.(html|vm)$";

fn babel_options(kind: TargetKind) -> Value {
    let env_targets = match kind {
        TargetKind::Server | TargetKind::Hooks | TargetKind::Headless => json!({ "ie": "11" }),
        TargetKind::Client => json!("defaults"),
    };
    json!({
        "babelrc": false,
        "presets": [
            ["@babel/preset-env", { "targets": env_targets }],
            ["@babel/preset-react", { "runtime": "automatic" }],
            "@babel/preset-typescript"
        ]
    })
}

/// Build the loader rules for `kind`.
///
/// Scripts in `src/` always go through babel; packages listed in
/// `options.transpile_packages` are added to the same include list.
pub fn loader_rules(
    kind: TargetKind,
    src_dir: &Path,
    project_root: &Path,
    options: &LoaderOptions,
) -> Vec<LoaderRule> {
    let mut include = vec![src_dir.to_path_buf()];
    include.extend(
        options
            .transpile_packages
            .iter()
            .map(|pkg| project_root.join("node_modules").join(pkg)),
    );

    let mut rules = vec![LoaderRule {
        test: SCRIPT_TEST.to_string(),
        include,
        action: RuleAction::Use(vec![Loader {
            name: "babel-loader".to_string(),
            options: Some(babel_options(kind)),
        }]),
    }];

    match kind {
        TargetKind::Client => {
            rules.push(LoaderRule {
                test: STYLE_TEST.to_string(),
                include: Vec::new(),
                action: RuleAction::Use(vec![
                    Loader::plain("style-loader"),
                    Loader::plain("css-loader"),
                ]),
            });
            rules.push(LoaderRule {
                test: ASSET_TEST.to_string(),
                include: Vec::new(),
                action: RuleAction::AssetResource {
                    filename: "resource/[name]-[contenthash][ext]".to_string(),
                },
            });
        }
        TargetKind::Server => {
            rules.push(LoaderRule {
                test: TEMPLATE_TEST.to_string(),
                include: vec![src_dir.to_path_buf()],
                action: RuleAction::AssetSource,
            });
        }
        TargetKind::Hooks | TargetKind::Headless => {}
    }

    rules
}
