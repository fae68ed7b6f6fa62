//! The tablet manifest: one JSON document per edition day.
//!
//! Only the fields needed to locate page assets are modelled:
//!
//! ```text
//! { "sections": { "pubdate": "20150520",
//!                 "section": [ { "name": "News",
//!                                "pages": { "page": [ { "page_name": "A01",
//!                                                       "hires_pdf": "...",
//!                                                       "thumb_300": "..." } ] } } ] } }
//! ```
//!
//! Everything else in the document is ignored on parse but kept in
//! [`Manifest::raw`] so it can be written to disk exactly as received.

use crate::models::PageRecord;
use serde::{Deserialize, Deserializer};
use tracing::{debug, instrument};

/// Page name that identifies the front page of an edition.
pub const FRONT_PAGE: &str = "A01";

/// A fetched manifest: the original bytes plus the parsed fields.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub raw: Vec<u8>,
    pub document: TabletDocument,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TabletDocument {
    pub sections: Sections,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sections {
    #[serde(deserialize_with = "string_or_number")]
    pub pubdate: String,
    #[serde(default)]
    pub section: Vec<Section>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pages: Pages,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pages {
    #[serde(default)]
    pub page: Vec<Page>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub page_name: String,
    pub hires_pdf: Option<String>,
    pub thumb_300: Option<String>,
}

/// `pubdate` has been seen both quoted and as a bare integer.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s.trim().to_string(),
        Raw::Number(n) => n.to_string(),
    })
}

impl Manifest {
    /// Parse a manifest body, keeping the bytes for verbatim persistence.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, serde_json::Error> {
        let document = serde_json::from_slice(raw)?;
        Ok(Self {
            raw: raw.to_vec(),
            document,
        })
    }

    pub fn pubdate(&self) -> &str {
        &self.document.sections.pubdate
    }

    /// Every page in document order, or only pages named [`FRONT_PAGE`].
    ///
    /// Pages are not de-duplicated: a page name that appears in two sections
    /// yields two records.
    #[instrument(level = "debug", skip_all, fields(pubdate = %self.pubdate(), front_page_only = front_page_only))]
    pub fn page_records(&self, front_page_only: bool) -> Vec<PageRecord> {
        let date = self.pubdate();
        let records: Vec<PageRecord> = self
            .document
            .sections
            .section
            .iter()
            .flat_map(|section| section.pages.page.iter())
            .filter(|page| !front_page_only || page.page_name == FRONT_PAGE)
            .map(|page| PageRecord {
                date: date.to_string(),
                page_name: page.page_name.clone(),
                pdf: page.hires_pdf.clone(),
                thumb: page.thumb_300.clone(),
            })
            .collect();

        debug!(
            sections = ?self
                .document
                .sections
                .section
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>(),
            records = records.len(),
            "Parsed page records"
        );
        records
    }
}
