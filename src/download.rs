//! Per-page asset downloads.
//!
//! For each page the PDF and/or thumbnail is fetched unless it is already
//! saved. "Already saved" is decided by a [`SavedCheck`]; the default
//! [`ExistsCheck`] trusts any file at the final path, which is sound because
//! [`write_atomic`] only ever publishes complete files there.
//!
//! Every outcome, including failures, comes back as an [`AssetOutcome`]
//! value. Nothing in this module aborts a batch.

use crate::api::{Endpoints, Remote};
use crate::models::{AssetKind, PageRecord};
use crate::storage::{ArchiveLayout, write_atomic};
use crate::utils::is_safe_component;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};

/// Decides whether an asset at `path` needs no further download.
pub trait SavedCheck {
    async fn is_saved(&self, path: &Path) -> bool;
}

/// A file at the path counts as saved.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExistsCheck;

impl SavedCheck for ExistsCheck {
    async fn is_saved(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}

/// What happened to one asset of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    Downloaded {
        kind: AssetKind,
        path: PathBuf,
        bytes: usize,
    },
    AlreadyPresent {
        kind: AssetKind,
        path: PathBuf,
    },
    Failed {
        kind: AssetKind,
        page_name: String,
        file: String,
        reason: String,
    },
}

impl AssetOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, AssetOutcome::Failed { .. })
    }
}

/// Which assets to fetch for each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetSelection {
    pub pdfs: bool,
    pub thumbs: bool,
}

impl AssetSelection {
    fn kinds(&self) -> impl Iterator<Item = AssetKind> {
        [(self.pdfs, AssetKind::Pdf), (self.thumbs, AssetKind::Thumbnail)]
            .into_iter()
            .filter_map(|(wanted, kind)| wanted.then_some(kind))
    }
}

pub struct Downloader<'a, R, C> {
    remote: &'a R,
    endpoints: &'a Endpoints,
    layout: &'a ArchiveLayout,
    check: &'a C,
}

impl<'a, R: Remote, C: SavedCheck> Downloader<'a, R, C> {
    pub fn new(remote: &'a R, endpoints: &'a Endpoints, layout: &'a ArchiveLayout, check: &'a C) -> Self {
        Self {
            remote,
            endpoints,
            layout,
            check,
        }
    }

    /// Fetch the selected assets of one page, PDF first, saving them under
    /// the archive directory for `archive_date`.
    ///
    /// Remote URLs use the record's own publication date; local paths always
    /// use `archive_date` so one edition never spans two directories. Assets
    /// the manifest does not name are left out of the result.
    pub async fn download_page(
        &self,
        archive_date: &str,
        record: &PageRecord,
        selection: AssetSelection,
    ) -> Vec<AssetOutcome> {
        let mut outcomes = Vec::new();
        for kind in selection.kinds() {
            if let Some(outcome) = self.download_asset(archive_date, record, kind).await {
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    #[instrument(level = "info", skip_all, fields(date = %archive_date, page = %record.page_name, %kind))]
    async fn download_asset(
        &self,
        archive_date: &str,
        record: &PageRecord,
        kind: AssetKind,
    ) -> Option<AssetOutcome> {
        let Some(file) = record.file(kind) else {
            debug!("Manifest lists no file for this asset");
            return None;
        };
        let failed = |reason: String| AssetOutcome::Failed {
            kind,
            page_name: record.page_name.clone(),
            file: file.to_string(),
            reason,
        };

        if !is_safe_component(&record.date) || !is_safe_component(file) {
            error!(%file, "Refusing unsafe file name from manifest");
            return Some(failed(format!("unsafe file name {file:?} for date {:?}", record.date)));
        }

        let path = match kind {
            AssetKind::Pdf => self.layout.pdf_path(archive_date, file),
            AssetKind::Thumbnail => self.layout.thumb_path(archive_date, file),
        };
        if self.check.is_saved(&path).await {
            debug!(path = %path.display(), "Already saved");
            return Some(AssetOutcome::AlreadyPresent { kind, path });
        }

        let url = match self.endpoints.asset_url(&record.date, file) {
            Ok(url) => url,
            Err(e) => return Some(failed(e.to_string())),
        };
        let bytes = match self.remote.get_bytes(&url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(%url, error = %e, "Download failed");
                return Some(failed(e.to_string()));
            }
        };
        if let Err(e) = write_atomic(&path, &bytes).await {
            error!(path = %path.display(), error = %e, "Failed to save asset");
            return Some(failed(e.to_string()));
        }

        info!(path = %path.display(), bytes = bytes.len(), "Saved");
        Some(AssetOutcome::Downloaded {
            kind,
            path,
            bytes: bytes.len(),
        })
    }
}
