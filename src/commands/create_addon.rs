use super::Context;
use crate::config::{AppType, DevProperties, SiteTarget, load_manifest};
use crate::error::Result;
use crate::remote::{self, RemoteResponse, url_builders};
use crate::ui as output;
use reqwest::blocking::Client;
use reqwest::blocking::multipart::Form;

/// Category every new add-on is filed under
pub const ADDON_CATEGORY: &str = "Other";

pub fn create(client: &Client, target: &SiteTarget, app_type: AppType) -> Result<RemoteResponse> {
    let url = url_builders::create_addon_url(target, app_type)?;
    let form = Form::new()
        .text("name", target.addon_name.clone())
        .text("category", ADDON_CATEGORY);
    remote::post_multipart(client, &url, target, form)?.into_result()
}

/// `create-addon`: register the add-on named in the dev properties on the site.
pub fn run(ctx: &Context) -> Result<()> {
    let loaded = load_manifest(&ctx.root)?;
    let props = DevProperties::load(&ctx.root)?;
    let target = SiteTarget::for_create_addon(&ctx.env, props.as_ref())?;

    output::info(&format!(
        "Creating {} add-on '{}' on {}",
        loaded.manifest.app_type, target.addon_name, target.domain
    ));
    let client = remote::client()?;
    let response = create(&client, &target, loaded.manifest.app_type)?;
    response.report_success(&format!("Created add-on {}", target.addon_name));
    Ok(())
}
