//! `sign`: send the zip to the signing service and store the signed copy.

use super::Context;
use crate::config::{Environment, environment, load_manifest};
use crate::error::{Result, ScriptsError};
use crate::project_identity::{SIGNING_ENDPOINT, cli_with, signed_zip_file_name, zip_file_name};
use crate::remote;
use crate::ui::{self as output, prompt};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const SIGNING_FAILED: &str = "Signing failed. Please try again later.";
pub const SIGNING_UNAUTHORIZED: &str =
    "Signing failed: bad credentials. Verify the username and password of your developer account.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningCredentials {
    pub username: String,
    pub password: String,
    pub certificate_name: Option<String>,
}

impl SigningCredentials {
    /// `SIGN_*` variables first, prompting for whatever is missing.
    pub fn resolve(env: &Environment) -> Result<Self> {
        let username = match env.get(environment::SIGN_USERNAME) {
            Some(value) => value,
            None => prompt::text(env, "Developer account username", None)?,
        };
        let password = match env.get(environment::SIGN_PASSWORD) {
            Some(value) => value,
            None => prompt::secret(env, "Developer account password")?,
        };
        let certificate_name = match env.get(environment::SIGN_CERTIFICATE_NAME) {
            Some(value) => Some(value),
            None if env.is_ci() => None,
            None => prompt::optional_text(env, "Certificate name (leave empty for default)")?,
        };
        Ok(Self {
            username,
            password,
            certificate_name,
        })
    }
}

static DEFAULT_ENDPOINT: LazyLock<Url> =
    LazyLock::new(|| Url::parse(SIGNING_ENDPOINT).expect("Valid signing endpoint"));

pub struct SigningService {
    endpoint: Url,
}

impl Default for SigningService {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.clone(),
        }
    }
}

impl SigningService {
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint }
    }

    /// One signing attempt. On 200 the response body is written to `signed`.
    pub fn sign(&self, credentials: &SigningCredentials, zip: &Path, signed: &Path) -> Result<()> {
        let client = remote::client()?;

        let file_part = Part::file(zip).map_err(|e| ScriptsError::IoError {
            path: zip.to_path_buf(),
            source: e,
        })?;
        let mut form = Form::new()
            .text("username", credentials.username.clone())
            .text("password", credentials.password.clone());
        if let Some(name) = &credentials.certificate_name {
            form = form.text("certificateName", name.clone());
        }
        form = form.part("file", file_part);

        output::verbose(&format!("POST {}", self.endpoint));
        let mut response = client
            .post(self.endpoint.clone())
            .basic_auth(&credentials.username, Some(&credentials.password))
            .multipart(form)
            .send()
            .map_err(|e| {
                output::verbose(&e.to_string());
                ScriptsError::RemoteFailure(SIGNING_FAILED.to_string())
            })?;

        match response.status() {
            StatusCode::OK => {
                let mut out = File::create(signed).map_err(|e| ScriptsError::IoError {
                    path: signed.to_path_buf(),
                    source: e,
                })?;
                if let Err(e) = response.copy_to(&mut out) {
                    drop(out);
                    let _ = fs::remove_file(signed);
                    output::verbose(&e.to_string());
                    return Err(ScriptsError::RemoteFailure(SIGNING_FAILED.to_string()));
                }
                Ok(())
            }
            StatusCode::UNAUTHORIZED => Err(ScriptsError::RemoteFailure(SIGNING_UNAUTHORIZED.to_string())),
            other => {
                output::verbose(&format!("Signing service answered HTTP {}", other));
                Err(ScriptsError::RemoteFailure(SIGNING_FAILED.to_string()))
            }
        }
    }
}

/// Zip for the current app id, or an error telling the user to build first
pub fn existing_zip(ctx: &Context) -> Result<(String, PathBuf)> {
    let loaded = load_manifest(&ctx.root)?;
    let app_id = ctx.env.full_app_id(&loaded.manifest.id);
    let zip = ctx.dist_dir().join(zip_file_name(&app_id));
    if !zip.is_file() {
        return Err(ScriptsError::ArtifactMissing {
            what: "Zip file".to_string(),
            path: zip,
            hint: format!("Run '{}' first.", cli_with("build")),
        });
    }
    Ok((app_id, zip))
}

pub fn run(ctx: &Context, service: &SigningService) -> Result<PathBuf> {
    let (app_id, zip) = existing_zip(ctx)?;
    let credentials = SigningCredentials::resolve(&ctx.env)?;
    let signed = ctx.dist_dir().join(signed_zip_file_name(&app_id));

    output::info(&format!("Signing {}", zip.display()));
    service.sign(&credentials, &zip, &signed)?;
    output::success(&format!("Signed zip written to {}", signed.display()));
    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn credentials_come_from_environment_under_ci() {
        let env = Environment::isolated()
            .with(environment::CI, "true")
            .with(environment::SIGN_USERNAME, "dev")
            .with(environment::SIGN_PASSWORD, "secret");

        let creds = SigningCredentials::resolve(&env).unwrap();
        assert_eq!(creds.username, "dev");
        assert_eq!(creds.password, "secret");
        assert_eq!(creds.certificate_name, None);
    }

    #[test]
    fn missing_credentials_under_ci_fail_instead_of_prompting() {
        let env = Environment::isolated().with(environment::CI, "1");
        assert!(matches!(
            SigningCredentials::resolve(&env),
            Err(ScriptsError::ConfigError(_))
        ));
    }

    #[test]
    fn default_service_targets_the_signing_endpoint() {
        assert_eq!(SigningService::default().endpoint.as_str(), SIGNING_ENDPOINT);
    }

    #[test]
    fn sign_requires_existing_zip() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("manifest.json"), r#"{"id":"my-app"}"#).unwrap();
        let ctx = Context::new(dir.path(), Environment::isolated().with(environment::CI, "1"));

        let err = run(&ctx, &SigningService::default()).unwrap_err();
        match err {
            ScriptsError::ArtifactMissing { path, .. } => {
                assert_eq!(path, dir.path().join("dist/my-app.zip"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
