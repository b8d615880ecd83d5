//! Thin wrappers over dialoguer. Each refuses to run under CI, where there is
//! nobody to answer.

use crate::config::Environment;
use crate::error::{Result, ScriptsError};
use dialoguer::{Confirm, Input, Password};

fn ensure_interactive(env: &Environment, label: &str) -> Result<()> {
    if env.is_ci() {
        return Err(ScriptsError::ConfigError(format!(
            "'{}' is required but CI is set, so it cannot be asked for interactively",
            label
        )));
    }
    Ok(())
}

fn prompt_err(e: dialoguer::Error) -> ScriptsError {
    ScriptsError::Other(format!("Prompt failed: {}", e))
}

pub fn text(env: &Environment, label: &str, default: Option<&str>) -> Result<String> {
    ensure_interactive(env, label)?;
    let mut input = Input::<String>::new().with_prompt(label);
    if let Some(default) = default.filter(|d| !d.is_empty()) {
        input = input.default(default.to_string());
    }
    input.interact_text().map_err(prompt_err)
}

/// Optional value; empty input means `None`
pub fn optional_text(env: &Environment, label: &str) -> Result<Option<String>> {
    ensure_interactive(env, label)?;
    let value: String = Input::new()
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    let value = value.trim().to_string();
    Ok(if value.is_empty() { None } else { Some(value) })
}

pub fn secret(env: &Environment, label: &str) -> Result<String> {
    ensure_interactive(env, label)?;
    Password::new()
        .with_prompt(label)
        .interact()
        .map_err(prompt_err)
}

pub fn confirm(env: &Environment, label: &str, default: bool) -> Result<bool> {
    ensure_interactive(env, label)?;
    Confirm::new()
        .with_prompt(label)
        .default(default)
        .interact()
        .map_err(prompt_err)
}

/// `text` or `secret`, matching the callback shape of credential resolvers
pub fn field(env: &Environment, label: &str, is_secret: bool) -> Result<String> {
    if is_secret {
        secret(env, label)
    } else {
        text(env, label, None)
    }
}
