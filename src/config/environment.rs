//! Environment variable access.
//!
//! Commands read the process environment through [`Environment`] so that the
//! lookups can be pinned in tests without touching the real environment.

use std::collections::HashMap;

pub const APP_ID_PREFIX: &str = "APP_ID_PREFIX";
pub const APP_ID_SUFFIX: &str = "APP_ID_SUFFIX";
pub const CI: &str = "CI";

pub const DEPLOY_DOMAIN: &str = "DEPLOY_DOMAIN";
pub const DEPLOY_SITE_NAME: &str = "DEPLOY_SITE_NAME";
pub const DEPLOY_ADDON_NAME: &str = "DEPLOY_ADDON_NAME";
pub const DEPLOY_USERNAME: &str = "DEPLOY_USERNAME";
pub const DEPLOY_PASSWORD: &str = "DEPLOY_PASSWORD";

pub const PROPS_DOMAIN: &str = "PROPS_DOMAIN";
pub const PROPS_SITE_NAME: &str = "PROPS_SITE_NAME";
pub const PROPS_ADDON_NAME: &str = "PROPS_ADDON_NAME";
pub const PROPS_USERNAME: &str = "PROPS_USERNAME";
pub const PROPS_PASSWORD: &str = "PROPS_PASSWORD";

pub const SIGN_USERNAME: &str = "SIGN_USERNAME";
pub const SIGN_PASSWORD: &str = "SIGN_PASSWORD";
pub const SIGN_CERTIFICATE_NAME: &str = "SIGN_CERTIFICATE_NAME";

#[derive(Debug, Clone, Default)]
pub struct Environment {
    overrides: HashMap<String, Option<String>>,
    isolated: bool,
}

impl Environment {
    /// Reads the real process environment
    pub fn process() -> Self {
        Self::default()
    }

    /// Sees only values given through [`Environment::with`]
    pub fn isolated() -> Self {
        Self {
            overrides: HashMap::new(),
            isolated: true,
        }
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.overrides
            .insert(key.to_string(), Some(value.to_string()));
        self
    }

    pub fn without(mut self, key: &str) -> Self {
        self.overrides.insert(key.to_string(), None);
        self
    }

    /// Non-empty value of `key`
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match self.overrides.get(key) {
            Some(value) => value.clone(),
            None if self.isolated => None,
            None => std::env::var(key).ok(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    pub fn is_ci(&self) -> bool {
        self.get(CI)
            .map(|v| v != "false" && v != "0")
            .unwrap_or(false)
    }

    /// `APP_ID_PREFIX + id + APP_ID_SUFFIX`; unset parts are empty.
    pub fn full_app_id(&self, id: &str) -> String {
        format!(
            "{}{}{}",
            self.get(APP_ID_PREFIX).unwrap_or_default(),
            id,
            self.get(APP_ID_SUFFIX).unwrap_or_default()
        )
    }
}
