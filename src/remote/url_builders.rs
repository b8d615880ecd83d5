use crate::config::{AppType, SiteTarget};
use crate::error::{Result, ScriptsError};
use reqwest::Url;

const REST_API_PREFIX: &str = "rest-api/1/0";
const ADDON_REPOSITORY: &str = "Addon Repository";

/// REST operation that imports a built add-on archive
pub fn import_endpoint(app_type: AppType) -> &'static str {
    match app_type {
        AppType::Web | AppType::Widget => "webAppImport",
        AppType::Rest => "restAppImport",
    }
}

/// REST operation that creates an empty add-on
pub fn creation_endpoint(app_type: AppType) -> &'static str {
    match app_type {
        AppType::Web => "custommodule",
        AppType::Rest => "headlesscustommodule",
        AppType::Widget => "widgetcustommodule",
    }
}

fn rest_api_root(target: &SiteTarget) -> Result<Url> {
    let raw = format!(
        "{}://{}/{}/",
        target.scheme.as_str(),
        target.domain.trim_end_matches('/'),
        REST_API_PREFIX
    );
    Url::parse(&raw).map_err(|e| {
        ScriptsError::ConfigError(format!("Invalid domain '{}': {}", target.domain, e))
    })
}

/// Append percent-encoded path segments to `url`
fn push_segments(mut url: Url, segments: &[&str]) -> Result<Url> {
    let rendered = url.to_string();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ScriptsError::ConfigError(format!("Cannot extend URL {}", rendered)))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

/// `{scheme}://{domain}/rest-api/1/0/{site}/Addon%20Repository/{addon}/{import}`
pub fn deploy_url(target: &SiteTarget, app_type: AppType, force: bool) -> Result<Url> {
    let mut url = push_segments(
        rest_api_root(target)?,
        &[
            &target.site_name,
            ADDON_REPOSITORY,
            &target.addon_name,
            import_endpoint(app_type),
        ],
    )?;
    if force {
        url.query_pairs_mut().append_pair("force", "true");
    }
    Ok(url)
}

/// `{scheme}://{domain}/rest-api/1/0/{site}/Addon%20Repository/{creation}`
pub fn create_addon_url(target: &SiteTarget, app_type: AppType) -> Result<Url> {
    push_segments(
        rest_api_root(target)?,
        &[&target.site_name, ADDON_REPOSITORY, creation_endpoint(app_type)],
    )
}

/// `{scheme}://{domain}/rest-api/1/0/{executableId}/activate`
pub fn activate_url(target: &SiteTarget, executable_id: &str) -> Result<Url> {
    push_segments(rest_api_root(target)?, &[executable_id, "activate"])
}
