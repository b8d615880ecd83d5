//! HTTP access to the CMS REST API and the signing service.
//!
//! Every response goes through [`RemoteResponse`], which reads the body as
//! JSON when it can (whatever the status) and turns failures into messages
//! with a hint for the common status codes.

pub mod url_builders;

use crate::config::SiteTarget;
use crate::error::{Result, ScriptsError};
use crate::project_identity::BINARY_NAME;
use crate::ui as output;
use reqwest::Url;
use reqwest::blocking::multipart::Form;
use reqwest::blocking::{Client, Response};
use serde_json::Value;

pub const UNAUTHORIZED_HINT: &str =
    "Authentication failed. Verify username and password.";
pub const FORBIDDEN_HINT: &str = "Permission denied. Verify that the user has sufficient permissions and that the REST API is enabled on the site.";
pub const NOT_FOUND_HINT: &str =
    "Could not find the addon. Verify that domain, siteName and addonName are correct.";
pub const SERVER_ERROR_HINT: &str =
    "The server encountered an internal error. Check the site log for details.";

pub fn status_hint(status: u16) -> Option<&'static str> {
    match status {
        401 => Some(UNAUTHORIZED_HINT),
        403 => Some(FORBIDDEN_HINT),
        404 => Some(NOT_FOUND_HINT),
        500 => Some(SERVER_ERROR_HINT),
        _ => None,
    }
}

/// Client used for every request. Only the user agent is configured, so
/// the client's default timeouts apply.
pub fn client() -> Result<Client> {
    Client::builder()
        .user_agent(format!("{}/{}", BINARY_NAME, env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ScriptsError::HttpError(e.to_string()))
}

#[derive(Debug, Clone)]
pub struct RemoteResponse {
    pub status: u16,
    pub reason: String,
    pub json: Option<Value>,
    pub body: String,
}

impl RemoteResponse {
    pub fn read(response: Response) -> Result<Self> {
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ScriptsError::HttpError(e.to_string()))?;
        Ok(Self::from_parts(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            body,
        ))
    }

    pub fn from_parts(status: u16, reason: &str, body: String) -> Self {
        let json = serde_json::from_str::<Value>(&body).ok();
        Self {
            status,
            reason: reason.to_string(),
            json,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// User-facing explanation of a failed request
    pub fn failure_message(&self) -> String {
        let mut message = match status_hint(self.status) {
            Some(hint) => format!("Request failed with HTTP {}. {}", self.status, hint),
            None => format!("Request failed with HTTP {} {}", self.status, self.reason)
                .trim_end()
                .to_string(),
        };
        if let Some(json) = &self.json {
            let pretty = serde_json::to_string_pretty(json).unwrap_or_else(|_| self.body.clone());
            message.push_str(&format!("\nResponse: {}", pretty));
        }
        message
    }

    /// `Ok(self)` on 2xx, otherwise a `RemoteFailure` with the hint.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ScriptsError::RemoteFailure(self.failure_message()))
        }
    }

    /// Print the JSON body, or `fallback` when there is none
    pub fn report_success(&self, fallback: &str) {
        match &self.json {
            Some(json) => {
                output::success(fallback);
                let pretty = serde_json::to_string_pretty(json).unwrap_or_else(|_| self.body.clone());
                output::indent(&pretty, 1);
            }
            None => output::success(fallback),
        }
    }
}

fn send_error(url: &Url) -> impl FnOnce(reqwest::Error) -> ScriptsError + '_ {
    move |e| ScriptsError::HttpError(format!("{} ({})", e, url))
}

/// Authenticated multipart POST
pub fn post_multipart(client: &Client, url: &Url, target: &SiteTarget, form: Form) -> Result<RemoteResponse> {
    output::verbose(&format!("POST {}", url));
    let response = client
        .post(url.clone())
        .basic_auth(&target.username, Some(&target.password))
        .multipart(form)
        .send()
        .map_err(send_error(url))?;
    RemoteResponse::read(response)
}

/// Authenticated PUT without a body
pub fn put(client: &Client, url: &Url, target: &SiteTarget) -> Result<RemoteResponse> {
    output::verbose(&format!("PUT {}", url));
    let response = client
        .put(url.clone())
        .basic_auth(&target.username, Some(&target.password))
        .send()
        .map_err(send_error(url))?;
    RemoteResponse::read(response)
}
