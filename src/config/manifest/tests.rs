use super::*;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn loads_root_manifest_first() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "manifest.json",
        r#"{"id":"root-app","version":"1.0.0","type":"WebApp","bundled":true}"#,
    );
    write(dir.path(), "static/manifest.json", r#"{"id":"static-app"}"#);

    let loaded = load_manifest(dir.path()).unwrap();
    assert_eq!(loaded.manifest.id, "root-app");
    assert_eq!(loaded.manifest.app_type, AppType::Web);
    assert!(loaded.manifest.bundled);
    assert_eq!(loaded.path, dir.path().join("manifest.json"));
}

#[test]
fn falls_back_to_legacy_static_location() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "static/manifest.json",
        r#"{"id":"legacy","type":"RESTApp"}"#,
    );

    let loaded = load_manifest(dir.path()).unwrap();
    assert_eq!(loaded.manifest.id, "legacy");
    assert_eq!(loaded.manifest.app_type, AppType::Rest);
    assert!(!loaded.manifest.bundled);
}

#[test]
fn skips_unparsable_candidate() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "manifest.json", "{ not json");
    write(dir.path(), "src/manifest.json", r#"{"id":"from-src","type":"Widget"}"#);

    let loaded = load_manifest(dir.path()).unwrap();
    assert_eq!(loaded.manifest.id, "from-src");
    assert_eq!(loaded.manifest.app_type, AppType::Widget);
}

#[test]
fn error_lists_every_attempted_path() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "static/manifest.json", r#"{"version":"1"}"#);

    let err = load_manifest(dir.path()).unwrap_err();
    let message = err.to_string();
    for candidate in manifest_candidates(dir.path()) {
        assert!(message.contains(&candidate.display().to_string()));
    }
    assert!(message.contains("not found"));
    assert!(message.contains("missing field `id`"));
}

#[test]
fn app_type_accepts_short_and_manifest_names() {
    assert_eq!(AppType::parse("web"), Some(AppType::Web));
    assert_eq!(AppType::parse("RESTApp"), Some(AppType::Rest));
    assert_eq!(AppType::parse("widget"), Some(AppType::Widget));
    assert_eq!(AppType::parse("applet"), None);
    assert!(AppType::Widget.has_client());
    assert!(!AppType::Rest.has_client());
}
