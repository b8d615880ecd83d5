//! Central project identity contract.
//!
//! Names of the binary, the directories the pipeline reads and writes, and
//! the files it probes. Every path the commands touch is derived from here.

pub const BINARY_NAME: &str = "sitevision-scripts";

pub const SRC_DIR_NAME: &str = "src";
pub const STATIC_DIR_NAME: &str = "static";
pub const BUILD_DIR_NAME: &str = "build";
pub const DIST_DIR_NAME: &str = "dist";
pub const RESOURCE_DIR_NAME: &str = "resource";

pub const MANIFEST_FILE_NAME: &str = "manifest.json";
pub const PACKAGE_JSON_FILE_NAME: &str = "package.json";
pub const DEV_PROPERTIES_FILE_NAME: &str = ".dev_properties.json";
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Key inside package.json holding tool properties
pub const PACKAGE_PROPERTIES_KEY: &str = "sitevision_scripts_properties";

/// Generated webpack config lives in the npm cache area, never in `build/`
pub const WEBPACK_CONFIG_DIR: &str = "node_modules/.cache/sitevision-scripts";
pub const WEBPACK_CONFIG_FILE_NAME: &str = "webpack.config.cjs";

pub const SIGNING_ENDPOINT: &str = "https://developer.sitevision.se/rest-api/appsigner/signapp";

pub fn zip_file_name(app_id: &str) -> String {
    format!("{}.zip", app_id)
}

pub fn signed_zip_file_name(app_id: &str) -> String {
    format!("{}-signed.zip", app_id)
}

pub fn cli_with(args: &str) -> String {
    format!("{} {}", BINARY_NAME, args)
}
