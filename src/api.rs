//! Remote access to the tablet edition endpoints.
//!
//! All network traffic goes through the [`Remote`] trait so the rest of the
//! pipeline never touches `reqwest` directly:
//!
//! - [`HttpRemote`]: the production client
//! - [`Endpoints`]: URL templates for manifests and page assets
//! - [`fetch_manifest`]: one GET per date, with absence as a normal outcome
//!
//! Requests are issued one at a time and never retried. Files already saved
//! are skipped whenever a date is processed again.

use crate::manifest::Manifest;
use crate::models::EditionDate;
use crate::utils::truncate_for_log;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Errors from a single remote request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Something that can GET a URL and hand back the body.
///
/// A non-success status is an error; the body of an error response is
/// discarded.
pub trait Remote {
    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// [`Remote`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
}

impl HttpRemote {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

impl Remote for HttpRemote {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        debug!(bytes = body.len(), "GET complete");
        Ok(body.to_vec())
    }
}

/// URL templates for the manifest and asset endpoints.
///
/// `{date}` expands to the `YYYYMMDD` edition date in both templates and
/// `{file}` to the asset file name in the asset template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    manifest: String,
    asset: String,
}

impl Endpoints {
    pub fn new(manifest: impl Into<String>, asset: impl Into<String>) -> Self {
        Self {
            manifest: manifest.into(),
            asset: asset.into(),
        }
    }

    pub fn manifest_url(&self, date: &str) -> Result<Url, FetchError> {
        parse_url(self.manifest.replace("{date}", date))
    }

    pub fn asset_url(&self, date: &str, file: &str) -> Result<Url, FetchError> {
        parse_url(self.asset.replace("{date}", date).replace("{file}", file))
    }
}

fn parse_url(raw: String) -> Result<Url, FetchError> {
    Url::parse(&raw).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))
}

/// Fetch and parse the manifest for `date`.
///
/// Returns `None` when there is no edition to archive: the request failed,
/// the server answered with an error status, the body was empty, or the body
/// was not a manifest. Days without a published edition (weekends, holidays)
/// land here routinely, so none of these are raised as errors.
#[instrument(level = "info", skip_all, fields(%date))]
pub async fn fetch_manifest<R: Remote>(
    remote: &R,
    endpoints: &Endpoints,
    date: EditionDate,
) -> Option<Manifest> {
    let url = match endpoints.manifest_url(&date.to_string()) {
        Ok(url) => url,
        Err(e) => {
            warn!(error = %e, "Cannot build manifest URL");
            return None;
        }
    };

    let body = match remote.get_bytes(&url).await {
        Ok(body) => body,
        Err(e) => {
            info!(%url, error = %e, "No manifest available");
            return None;
        }
    };

    if body.iter().all(u8::is_ascii_whitespace) {
        info!(%url, "Manifest response had an empty body");
        return None;
    }

    match Manifest::from_bytes(&body) {
        Ok(manifest) => {
            debug!(pubdate = %manifest.pubdate(), bytes = manifest.raw.len(), "Fetched manifest");
            Some(manifest)
        }
        Err(e) => {
            warn!(
                %url,
                error = %e,
                preview = %truncate_for_log(&body, 200),
                "Manifest body is not a tablet manifest"
            );
            None
        }
    }
}
