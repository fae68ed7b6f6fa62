//! # Tablet Archiver
//!
//! Archives a newspaper's daily digital edition to local storage. Each
//! edition day has a JSON "tablet" manifest listing every page with its high
//! resolution PDF and a 300px thumbnail; this tool saves the manifest and the
//! files it names into one directory per date.
//!
//! ## Usage
//!
//! ```sh
//! tablet_archiver --all
//! tablet_archiver --date 20150520 --front-page-only
//! ```
//!
//! ## Architecture
//!
//! The application is a sequential pipeline:
//! 1. **Dates**: work out which days are missing from the archive
//! 2. **Manifest**: fetch each day's manifest, skipping days without one
//! 3. **Storage**: create the day's directories and save the raw manifest
//! 4. **Assets**: download every page's PDF and thumbnail not yet on disk
//!
//! One request is in flight at a time and nothing is retried. Re-running the
//! tool picks up dates that have no directory yet; a date that was started
//! but left with failed files is retried with `--date`.

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod dates;
mod download;
mod manifest;
mod models;
mod run;
mod storage;
mod utils;

#[cfg(test)]
mod testing;

use api::HttpRemote;
use cli::{Cli, Mode};
use config::Config;
use dates::{RangeRequest, dates_to_fetch};
use download::{AssetSelection, ExistsCheck};
use models::EditionDate;
use run::{Archiver, RunOptions};
use storage::{ArchiveLayout, ensure_writable_dir};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();

    // Parse CLI; a missing run mode exits here with a usage error
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");
    info!("tablet_archiver starting up");

    let config = Config::load(args.config.as_deref())?;
    let out_dir = args.out.clone().unwrap_or_else(|| config.out_dir.clone());
    let layout = ArchiveLayout::new(out_dir);

    if let Err(e) = ensure_writable_dir(layout.root()).await {
        tracing::error!(
            path = %layout.root().display(),
            error = %e,
            "Archive directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let dates = select_dates(&args, &config, &layout).await?;
    info!(count = dates.len(), "Dates to download");
    debug!(dates = ?dates.iter().map(ToString::to_string).collect::<Vec<_>>(), "Date list");

    let remote = HttpRemote::new(&config.user_agent)?;
    let endpoints = config.endpoints();
    let options = RunOptions {
        assets: AssetSelection {
            pdfs: !args.no_pdf,
            thumbs: !args.no_thumbs,
        },
        front_page_only: args.front_page_only,
    };
    let archiver = Archiver::new(&remote, &endpoints, &layout, &ExistsCheck, options);
    let summary = archiver.run_dates(&dates).await;

    if summary.has_failures() {
        // These dates now have a directory, so --all and --range treat them
        // as archived.
        warn!(
            failed = summary.failed,
            storage_failed = summary.storage_failed,
            dates = ?summary.failed_dates.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "Some files were not saved; retry each date with --date <YYYYMMDD> \
             (or --recheck-recent --recheck-days N if they are the most recent days)"
        );
    }

    let elapsed = start_time.elapsed();
    info!(
        dates = summary.dates,
        skipped = summary.skipped,
        pages = summary.pages,
        downloaded = summary.downloaded,
        already_present = summary.already_present,
        failed = summary.failed,
        storage_failed = summary.storage_failed,
        secs = elapsed.as_secs(),
        "Completed"
    );

    Ok(())
}

/// Resolve the run mode into the list of dates to process.
async fn select_dates(
    args: &Cli,
    config: &Config,
    layout: &ArchiveLayout,
) -> Result<Vec<EditionDate>, Box<dyn Error>> {
    let (start, end) = match args.mode() {
        Mode::Single(date) => return Ok(vec![date]),
        Mode::Range { start, end } => (start, end),
        Mode::All => (None, None),
    };

    let request = RangeRequest {
        start: match start {
            Some(start) => start,
            None => config.first_date()?,
        },
        end: end.unwrap_or_else(EditionDate::today),
        auto_start: args.auto_start,
        recheck_recent: args.recheck_recent,
        recheck_days: args.recheck_days,
    };
    let archived = layout.archived_dates().await?;
    Ok(dates_to_fetch(&request, &archived))
}
