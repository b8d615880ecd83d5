//! Developer and package properties.
//!
//! `.dev_properties.json` holds the connection info for the development
//! site, `package.json` may carry tool switches under
//! `sitevision_scripts_properties`.

use crate::config::environment::{self, Environment};
use crate::error::{Result, ScriptsError};
use crate::project_identity::{
    DEV_PROPERTIES_FILE_NAME, PACKAGE_JSON_FILE_NAME, PACKAGE_PROPERTIES_KEY,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevProperties {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub site_name: String,
    #[serde(default)]
    pub addon_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(rename = "useHTTPForDevDeploy", default)]
    pub use_http_for_dev_deploy: bool,
    /// Legacy location of the transpile switch, package.json wins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transpile: Option<bool>,
}

impl DevProperties {
    pub fn path(root: &Path) -> PathBuf {
        root.join(DEV_PROPERTIES_FILE_NAME)
    }

    /// Read `.dev_properties.json`; `Ok(None)` when the file does not exist.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = Self::path(root);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| ScriptsError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let props = serde_json::from_str(&content).map_err(|e| ScriptsError::ParseError {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(props))
    }

    /// Like [`DevProperties::load`] but a missing file is an error
    pub fn load_required(root: &Path) -> Result<Self> {
        Self::load(root)?.ok_or_else(|| {
            ScriptsError::ConfigError(format!(
                "{} not found. Run '{}' first.",
                DEV_PROPERTIES_FILE_NAME,
                crate::project_identity::cli_with("setup-dev-properties")
            ))
        })
    }

    pub fn save(&self, root: &Path) -> Result<PathBuf> {
        let path = Self::path(root);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, format!("{}\n", content)).map_err(|e| ScriptsError::IoError {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageProperties {
    #[serde(default)]
    pub transpile: Option<bool>,
    /// node_modules packages that must go through the transpiler
    #[serde(default)]
    pub transpile_packages: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    #[serde(rename = "sitevision_scripts_properties", default)]
    properties: Option<PackageProperties>,
}

impl PackageProperties {
    /// Tool properties from package.json; defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(PACKAGE_JSON_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).map_err(|e| ScriptsError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let package: PackageJson =
            serde_json::from_str(&content).map_err(|e| ScriptsError::ParseError {
                file: format!("{} ({})", path.display(), PACKAGE_PROPERTIES_KEY),
                message: e.to_string(),
            })?;
        Ok(package.properties.unwrap_or_default())
    }
}

/// package.json switch first, then the legacy dev property, then on.
pub fn resolve_transpile(package: &PackageProperties, dev: Option<&DevProperties>) -> bool {
    package
        .transpile
        .or_else(|| dev.and_then(|d| d.transpile))
        .unwrap_or(true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// Everything needed to talk to one add-on on one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteTarget {
    pub scheme: Scheme,
    pub domain: String,
    pub site_name: String,
    pub addon_name: String,
    pub username: String,
    pub password: String,
}

/// Environment variable names for one credential source
struct TargetKeys {
    domain: &'static str,
    site_name: &'static str,
    addon_name: &'static str,
    username: &'static str,
    password: &'static str,
}

const PROPS_KEYS: TargetKeys = TargetKeys {
    domain: environment::PROPS_DOMAIN,
    site_name: environment::PROPS_SITE_NAME,
    addon_name: environment::PROPS_ADDON_NAME,
    username: environment::PROPS_USERNAME,
    password: environment::PROPS_PASSWORD,
};

const DEPLOY_KEYS: TargetKeys = TargetKeys {
    domain: environment::DEPLOY_DOMAIN,
    site_name: environment::DEPLOY_SITE_NAME,
    addon_name: environment::DEPLOY_ADDON_NAME,
    username: environment::DEPLOY_USERNAME,
    password: environment::DEPLOY_PASSWORD,
};

impl SiteTarget {
    /// Development site straight from `.dev_properties.json`
    pub fn dev(props: &DevProperties) -> Result<Self> {
        let target = Self {
            scheme: if props.use_http_for_dev_deploy {
                Scheme::Http
            } else {
                Scheme::Https
            },
            domain: props.domain.trim().to_string(),
            site_name: props.site_name.clone(),
            addon_name: props.addon_name.clone(),
            username: props.username.clone(),
            password: props.password.clone(),
        };
        target.require_complete(DEV_PROPERTIES_FILE_NAME)?;
        Ok(target)
    }

    /// `PROPS_*` variables override the dev properties field by field.
    pub fn for_create_addon(env: &Environment, props: Option<&DevProperties>) -> Result<Self> {
        let base = props.cloned().unwrap_or_default();
        let target = Self {
            scheme: if base.use_http_for_dev_deploy {
                Scheme::Http
            } else {
                Scheme::Https
            },
            domain: env.get(PROPS_KEYS.domain).unwrap_or(base.domain),
            site_name: env.get(PROPS_KEYS.site_name).unwrap_or(base.site_name),
            addon_name: env.get(PROPS_KEYS.addon_name).unwrap_or(base.addon_name),
            username: env.get(PROPS_KEYS.username).unwrap_or(base.username),
            password: env.get(PROPS_KEYS.password).unwrap_or(base.password),
        };
        target.require_complete(&format!(
            "{} or PROPS_* environment variables",
            DEV_PROPERTIES_FILE_NAME
        ))?;
        Ok(target)
    }

    /// Production site: `DEPLOY_*` variables, anything missing comes from
    /// `ask(label, secret)`. Always HTTPS.
    pub fn for_production<F>(env: &Environment, mut ask: F) -> Result<Self>
    where
        F: FnMut(&str, bool) -> Result<String>,
    {
        let mut field = |key: &str, label: &str, secret: bool| -> Result<String> {
            match env.get(key) {
                Some(value) => Ok(value),
                None => ask(label, secret),
            }
        };

        let target = Self {
            scheme: Scheme::Https,
            domain: field(DEPLOY_KEYS.domain, "Domain", false)?,
            site_name: field(DEPLOY_KEYS.site_name, "Site name", false)?,
            addon_name: field(DEPLOY_KEYS.addon_name, "Addon name", false)?,
            username: field(DEPLOY_KEYS.username, "Username", false)?,
            password: field(DEPLOY_KEYS.password, "Password", true)?,
        };
        target.require_complete("DEPLOY_* environment variables")?;
        Ok(target)
    }

    fn require_complete(&self, source_name: &str) -> Result<()> {
        let fields = [
            ("domain", &self.domain),
            ("siteName", &self.site_name),
            ("addonName", &self.addon_name),
            ("username", &self.username),
            ("password", &self.password),
        ];
        for (key, value) in fields {
            if value.trim().is_empty() {
                return Err(ScriptsError::MissingProperty {
                    key: key.to_string(),
                    source_name: source_name.to_string(),
                });
            }
        }
        Ok(())
    }
}
