//! `setup-dev-properties`: ask for the development site and store it.

use super::Context;
use crate::config::DevProperties;
use crate::error::{Result, ScriptsError};
use crate::project_identity::{DEV_PROPERTIES_FILE_NAME, GITIGNORE_FILE_NAME};
use crate::ui::{self as output, prompt};
use std::fs;
use std::path::Path;

pub fn run(ctx: &Context) -> Result<()> {
    if ctx.env.is_ci() {
        return Err(ScriptsError::ConfigError(
            "setup-dev-properties is interactive and cannot run when CI is set".to_string(),
        ));
    }

    let existing = DevProperties::load(&ctx.root)?.unwrap_or_default();
    let env = &ctx.env;
    output::header("Development site");

    let domain = prompt::text(env, "Domain (e.g. www.example.com)", Some(&existing.domain))?;
    let site_name = prompt::text(env, "Site name", Some(&existing.site_name))?;
    let addon_name = prompt::text(env, "Addon name", Some(&existing.addon_name))?;
    let username = prompt::text(env, "Username", Some(&existing.username))?;
    let password = prompt::secret(env, "Password")?;
    let use_http = prompt::confirm(
        env,
        "Use HTTP instead of HTTPS for development deploys?",
        existing.use_http_for_dev_deploy,
    )?;

    let props = DevProperties {
        domain: domain.trim().to_string(),
        site_name,
        addon_name,
        username,
        password,
        use_http_for_dev_deploy: use_http,
        transpile: existing.transpile,
    };
    let path = props.save(&ctx.root)?;
    output::success(&format!("Wrote {}", path.display()));

    if ensure_gitignored(&ctx.root)? {
        output::info(&format!("Added {} to {}", DEV_PROPERTIES_FILE_NAME, GITIGNORE_FILE_NAME));
    }
    Ok(())
}

/// Append the properties file to `.gitignore` unless already listed.
pub fn ensure_gitignored(root: &Path) -> Result<bool> {
    let path = root.join(GITIGNORE_FILE_NAME);
    let content = if path.exists() {
        fs::read_to_string(&path).map_err(|e| ScriptsError::IoError {
            path: path.clone(),
            source: e,
        })?
    } else {
        String::new()
    };

    let listed = content.lines().any(|line| {
        let line = line.trim().trim_start_matches('/');
        line == DEV_PROPERTIES_FILE_NAME
    });
    if listed {
        return Ok(false);
    }

    let mut updated = content;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(DEV_PROPERTIES_FILE_NAME);
    updated.push('\n');
    fs::write(&path, updated).map_err(|e| ScriptsError::IoError {
        path: path.clone(),
        source: e,
    })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, environment};
    use tempfile::TempDir;

    #[test]
    fn appends_entry_once() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "node_modules\ndist").unwrap();

        assert!(ensure_gitignored(dir.path()).unwrap());
        assert!(!ensure_gitignored(dir.path()).unwrap());

        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content, "node_modules\ndist\n.dev_properties.json\n");
    }

    #[test]
    fn creates_gitignore_when_missing() {
        let dir = TempDir::new().unwrap();
        assert!(ensure_gitignored(dir.path()).unwrap());
        assert_eq!(
            fs::read_to_string(dir.path().join(".gitignore")).unwrap(),
            ".dev_properties.json\n"
        );
    }

    #[test]
    fn rooted_entry_counts_as_listed() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "/.dev_properties.json\n").unwrap();
        assert!(!ensure_gitignored(dir.path()).unwrap());
    }

    #[test]
    fn refuses_to_run_under_ci() {
        let dir = TempDir::new().unwrap();
        let ctx = Context::new(dir.path(), Environment::isolated().with(environment::CI, "true"));

        assert!(matches!(run(&ctx), Err(ScriptsError::ConfigError(_))));
        assert!(!dir.path().join(".dev_properties.json").exists());
    }
}
