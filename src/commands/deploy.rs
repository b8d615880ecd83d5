//! `deploy` to the development site and `deploy-prod` to production.

use super::Context;
use super::sign::existing_zip;
use crate::config::{AppType, DevProperties, SiteTarget, load_manifest};
use crate::error::{Result, ScriptsError};
use crate::pipeline::DeployMode;
use crate::project_identity::{cli_with, signed_zip_file_name};
use crate::remote::{self, RemoteResponse, url_builders};
use crate::ui::{self as output, prompt};
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use serde_json::Value;
use std::path::Path;

/// POST `zip` to the add-on's import endpoint.
pub fn upload(
    client: &Client,
    target: &SiteTarget,
    app_type: AppType,
    zip: &Path,
    force: bool,
) -> Result<RemoteResponse> {
    let url = url_builders::deploy_url(target, app_type, force)?;
    let part = Part::file(zip).map_err(|e| ScriptsError::IoError {
        path: zip.to_path_buf(),
        source: e,
    })?;
    let form = Form::new().part("file", part);
    remote::post_multipart(client, &url, target, form)?.into_result()
}

/// `deploy [force]`: upload `dist/{appId}.zip` to the site in `.dev_properties.json`.
pub fn run_dev(ctx: &Context, mode: DeployMode) -> Result<()> {
    let (app_id, zip) = existing_zip(ctx)?;
    let loaded = load_manifest(&ctx.root)?;
    let props = DevProperties::load_required(&ctx.root)?;
    let target = SiteTarget::dev(&props)?;
    let force = mode == DeployMode::Force;

    output::info(&format!(
        "Deploying {} to {}://{}{}",
        app_id,
        target.scheme.as_str(),
        target.domain,
        if force { " (force)" } else { "" }
    ));
    let client = remote::client()?;
    let response = upload(&client, &target, loaded.manifest.app_type, &zip, force)?;
    response.report_success(&format!("Deployed {}", app_id));
    Ok(())
}

/// `deploy-prod [--activate]`: upload the signed zip over HTTPS.
pub fn run_production(ctx: &Context, activate: bool) -> Result<()> {
    let loaded = load_manifest(&ctx.root)?;
    let app_id = ctx.env.full_app_id(&loaded.manifest.id);
    let signed = ctx.dist_dir().join(signed_zip_file_name(&app_id));
    if !signed.is_file() {
        return Err(ScriptsError::ArtifactMissing {
            what: "Signed zip file".to_string(),
            path: signed,
            hint: format!("Run '{}' first.", cli_with("sign")),
        });
    }

    let target = SiteTarget::for_production(&ctx.env, |label, secret| {
        prompt::field(&ctx.env, label, secret)
    })?;

    output::info(&format!("Deploying {} to production ({})", app_id, target.domain));
    let client = remote::client()?;
    deploy_signed(
        &client,
        &target,
        loaded.manifest.app_type,
        &signed,
        &app_id,
        activate,
    )?;
    Ok(())
}

/// What happened to the optional activation after a production upload.
#[derive(Debug)]
pub enum Activation {
    NotRequested,
    Activated(String),
    MissingExecutableId,
    Failed { executable_id: String, error: ScriptsError },
}

/// Upload the signed archive, then activate it when asked.
///
/// Only the upload can fail the command; an activation problem is logged
/// and reported back as an [`Activation`].
pub fn deploy_signed(
    client: &Client,
    target: &SiteTarget,
    app_type: AppType,
    signed: &Path,
    app_id: &str,
    activate: bool,
) -> Result<Activation> {
    let response = upload(client, target, app_type, signed, false)?;
    response.report_success(&format!("Deployed {}", app_id));

    if !activate {
        return Ok(Activation::NotRequested);
    }
    let Some(id) = executable_id(&response) else {
        output::warning("Deploy response carried no executable id, skipping activation");
        return Ok(Activation::MissingExecutableId);
    };
    match activate_executable(client, target, &id) {
        Ok(()) => Ok(Activation::Activated(id)),
        Err(error) => {
            output::error(&format!("Activation failed: {}", error));
            Ok(Activation::Failed {
                executable_id: id,
                error,
            })
        }
    }
}

/// Mark the deployed executable as active.
pub fn activate_executable(client: &Client, target: &SiteTarget, executable_id: &str) -> Result<()> {
    let url = url_builders::activate_url(target, executable_id)?;
    let response = remote::put(client, &url, target)?.into_result()?;
    response.report_success(&format!("Activated {}", executable_id));
    Ok(())
}

/// `id` of the deploy response, string or number.
pub fn executable_id(response: &RemoteResponse) -> Option<String> {
    match response.json.as_ref()?.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
