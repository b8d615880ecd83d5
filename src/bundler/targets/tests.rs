use super::*;
use std::fs;
use tempfile::TempDir;

fn project(files: &[&str]) -> (TempDir, ProjectLayout) {
    let dir = TempDir::new().unwrap();
    let layout = ProjectLayout::new(dir.path());
    fs::create_dir_all(&layout.src_dir).unwrap();
    for file in files {
        fs::write(layout.src_dir.join(file), "export default 1;").unwrap();
    }
    (dir, layout)
}

fn kinds(targets: &[BundleTarget]) -> Vec<TargetKind> {
    targets.iter().map(|t| t.kind).collect()
}

#[test]
fn web_app_with_every_entry_builds_all_targets_in_order() {
    let (_dir, layout) = project(&["index.js", "main.jsx", "hooks.ts", "headless.js"]);
    let targets = select_targets(AppType::Web, &layout, &LoaderOptions::default()).unwrap();

    assert_eq!(
        kinds(&targets),
        vec![
            TargetKind::Server,
            TargetKind::Client,
            TargetKind::Hooks,
            TargetKind::Headless
        ]
    );
    assert_eq!(targets[1].entry, layout.src_dir.join("main.jsx"));
    assert_eq!(targets[2].format, OutputFormat::Iife);
    assert_eq!(targets[0].output_dir, layout.build_dir);
    assert_eq!(targets[0].output_file, "index.js");
}

#[test]
fn web_app_without_client_entry_builds_server_only() {
    let (_dir, layout) = project(&["index.ts"]);
    let targets = select_targets(AppType::Web, &layout, &LoaderOptions::default()).unwrap();
    assert_eq!(kinds(&targets), vec![TargetKind::Server]);
    assert_eq!(targets[0].format, OutputFormat::CommonJs);
}

#[test]
fn rest_app_ignores_client_entry() {
    let (_dir, layout) = project(&["index.js", "main.js", "hooks.js"]);
    let targets = select_targets(AppType::Rest, &layout, &LoaderOptions::default()).unwrap();
    assert_eq!(kinds(&targets), vec![TargetKind::Server, TargetKind::Hooks]);
}

#[test]
fn missing_index_fails_for_every_app_type() {
    for app_type in [AppType::Web, AppType::Rest, AppType::Widget] {
        let (_dir, layout) = project(&["main.js"]);
        let err = select_targets(app_type, &layout, &LoaderOptions::default()).unwrap_err();
        assert!(matches!(err, ScriptsError::EntryNotFound { ref name, .. } if name == "index"));
    }
}

#[test]
fn widget_without_main_fails_after_trying_every_extension() {
    let (_dir, layout) = project(&["index.js", "hooks.js"]);
    let err = select_targets(AppType::Widget, &layout, &LoaderOptions::default()).unwrap_err();

    match err {
        ScriptsError::EntryNotFound { name, tried, .. } => {
            assert_eq!(name, "main");
            assert_eq!(tried, vec!["main.js", "main.jsx", "main.ts", "main.tsx"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn widget_accepts_any_client_extension() {
    for ext in ENTRY_EXTENSIONS {
        let main = format!("main.{ext}");
        let (_dir, layout) = project(&["index.js", main.as_str()]);
        let targets = select_targets(AppType::Widget, &layout, &LoaderOptions::default()).unwrap();
        assert_eq!(targets[1].entry, layout.src_dir.join(&main));
    }
}

#[test]
fn entry_extensions_are_tried_in_order() {
    let (_dir, layout) = project(&["index.tsx", "index.js"]);
    assert_eq!(
        find_entry(&layout.src_dir, "index"),
        Some(layout.src_dir.join("index.js"))
    );
}
