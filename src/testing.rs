//! Test fixtures: an in-memory remote and manifest builders.

use crate::api::{FetchError, Remote};
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

pub const BASE: &str = "https://tablet.test/v1.1";

/// Endpoint templates pointing at [`BASE`].
pub fn endpoints() -> crate::api::Endpoints {
    crate::api::Endpoints::new(
        format!("{BASE}/{{date}}/tablet_{{date}}.json"),
        format!("{BASE}/{{date}}/{{file}}"),
    )
}

/// Build a manifest body. Each section is `(name, "A01 A02 ...")`; every page
/// gets `<page>.pdf` and `<page>.jpg` as its asset names.
pub fn manifest_json(pubdate: &str, sections: &[(&str, &str)]) -> Vec<u8> {
    let sections: Vec<serde_json::Value> = sections
        .iter()
        .map(|(name, pages)| {
            let pages: Vec<serde_json::Value> = pages
                .split_whitespace()
                .map(|p| {
                    serde_json::json!({
                        "page_name": p,
                        "hires_pdf": format!("{p}.pdf"),
                        "thumb_300": format!("{p}.jpg"),
                    })
                })
                .collect();
            serde_json::json!({ "name": name, "pages": { "page": pages } })
        })
        .collect();

    serde_json::to_vec(&serde_json::json!({
        "sections": { "pubdate": pubdate, "section": sections }
    }))
    .unwrap()
}

/// Serves canned bodies by URL and records every URL requested.
/// Unknown URLs answer with HTTP 404.
#[derive(Debug, Default)]
pub struct FakeRemote {
    bodies: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests().iter().filter(|u| *u == url).count()
    }
}

impl Remote for FakeRemote {
    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.bodies.get(url.as_str()) {
            Some(body) => Ok(body.clone()),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
