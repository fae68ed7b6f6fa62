//! Per-date pipeline and the sequential loop over dates.
//!
//! For one date: fetch manifest → skip if absent → create directories →
//! save the raw manifest → parse page records → download each page's assets
//! in record order, one request at a time.
//!
//! A failed asset does not stop the date or the run. Failures are collected
//! into the [`DateReport`] and summarised at the end. A date whose directory
//! exists counts as archived for `--all` and `--range`, so failed files are
//! only fetched again by `--date <YYYYMMDD>` or when the date falls inside the
//! `--recheck-recent` window; those runs skip files already saved.

use crate::api::{Endpoints, Remote, fetch_manifest};
use crate::download::{AssetOutcome, AssetSelection, Downloader, SavedCheck};
use crate::models::EditionDate;
use crate::storage::ArchiveLayout;
use tracing::{error, info, instrument, warn};

/// Flags for one run, resolved from the command line and config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub assets: AssetSelection,
    pub front_page_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateOutcome {
    /// No manifest for the date; nothing was written.
    Skipped,
    /// Manifest saved and every page attempted.
    Archived {
        pages: usize,
        assets: Vec<AssetOutcome>,
    },
    /// The date directory or manifest could not be written.
    StorageFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateReport {
    pub date: EditionDate,
    pub outcome: DateOutcome,
}

/// Totals over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub dates: usize,
    pub skipped: usize,
    pub pages: usize,
    pub downloaded: usize,
    pub already_present: usize,
    pub failed: usize,
    /// Dates whose directory or manifest could not be written.
    pub storage_failed: usize,
    pub failed_dates: Vec<EditionDate>,
}

impl RunSummary {
    fn record(&mut self, report: &DateReport) {
        self.dates += 1;
        let mut date_failed = false;
        match &report.outcome {
            DateOutcome::Skipped => self.skipped += 1,
            DateOutcome::StorageFailed { .. } => {
                self.storage_failed += 1;
                date_failed = true;
            }
            DateOutcome::Archived { pages, assets } => {
                self.pages += pages;
                for asset in assets {
                    match asset {
                        AssetOutcome::Downloaded { .. } => self.downloaded += 1,
                        AssetOutcome::AlreadyPresent { .. } => self.already_present += 1,
                        AssetOutcome::Failed { .. } => {}
                    }
                }
                let failed = assets.iter().filter(|a| a.is_failure()).count();
                self.failed += failed;
                date_failed = failed > 0;
            }
        }
        if date_failed {
            self.failed_dates.push(report.date);
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_dates.is_empty()
    }
}

/// Dates between progress lines in [`Archiver::run_dates`].
const PROGRESS_EVERY: usize = 10;

/// Everything one run needs, passed in explicitly.
pub struct Archiver<'a, R, C> {
    remote: &'a R,
    endpoints: &'a Endpoints,
    layout: &'a ArchiveLayout,
    check: &'a C,
    options: RunOptions,
}

impl<'a, R: Remote, C: SavedCheck> Archiver<'a, R, C> {
    pub fn new(
        remote: &'a R,
        endpoints: &'a Endpoints,
        layout: &'a ArchiveLayout,
        check: &'a C,
        options: RunOptions,
    ) -> Self {
        Self {
            remote,
            endpoints,
            layout,
            check,
            options,
        }
    }

    /// Archive one date.
    #[instrument(level = "info", skip_all, fields(%date))]
    pub async fn run_date(&self, date: EditionDate) -> DateReport {
        info!("Processing");
        let outcome = self.archive(date).await;
        DateReport { date, outcome }
    }

    async fn archive(&self, date: EditionDate) -> DateOutcome {
        let Some(manifest) = fetch_manifest(self.remote, self.endpoints, date).await else {
            info!("SKIP: no edition published");
            return DateOutcome::Skipped;
        };

        let key = date.to_string();
        if manifest.pubdate() != key {
            warn!(pubdate = %manifest.pubdate(), "Manifest pubdate differs from requested date");
        }

        if let Err(e) = self.layout.init_date(&key, self.options.assets.thumbs).await {
            error!(error = %e, "Failed to create archive directory");
            return DateOutcome::StorageFailed { reason: e.to_string() };
        }
        if let Err(e) = self.layout.save_manifest(&key, &manifest.raw).await {
            error!(error = %e, "Failed to save manifest");
            return DateOutcome::StorageFailed { reason: e.to_string() };
        }

        let records = manifest.page_records(self.options.front_page_only);
        info!(pages = records.len(), "Downloading");

        let downloader = Downloader::new(self.remote, self.endpoints, self.layout, self.check);
        let mut assets = Vec::new();
        for record in &records {
            assets.extend(
                downloader
                    .download_page(&key, record, self.options.assets)
                    .await,
            );
        }

        for asset in &assets {
            if let AssetOutcome::Failed {
                kind,
                page_name,
                file,
                reason,
            } = asset
            {
                warn!(%kind, page = %page_name, %file, %reason, "Asset not saved");
            }
        }
        DateOutcome::Archived {
            pages: records.len(),
            assets,
        }
    }

    /// Archive each date in order, logging progress every few dates.
    pub async fn run_dates(&self, dates: &[EditionDate]) -> RunSummary {
        let mut summary = RunSummary::default();
        for (i, date) in dates.iter().enumerate() {
            let report = self.run_date(*date).await;
            summary.record(&report);

            let done = i + 1;
            if done % PROGRESS_EVERY == 0 {
                info!(remaining = dates.len() - done, "Progress");
            }
        }
        summary
    }
}
