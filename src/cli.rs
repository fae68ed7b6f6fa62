//! Command-line interface definitions for Tablet Archiver.
//!
//! Exactly one run mode is required: `--date`, `--range` or `--all`.
//! Omitting it is a usage error and clap exits with a message naming the
//! three flags.

use crate::models::EditionDate;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Command-line arguments for the Tablet Archiver application.
///
/// # Examples
///
/// ```sh
/// # One day, front pages only
/// tablet_archiver --date 20150520 --front-page-only
///
/// # Everything not yet archived, re-checking the last two days
/// tablet_archiver --all --recheck-recent --recheck-days 2
///
/// # A bounded range of PDFs into a custom directory
/// tablet_archiver --range --start 20160101 --end 20160131 --no-thumbs -o /srv/tablet
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(group(ArgGroup::new("mode").required(true).args(["date", "range", "all"])))]
pub struct Cli {
    /// Archive a single edition date (YYYYMMDD), even if already archived
    #[arg(short, long)]
    pub date: Option<EditionDate>,

    /// Archive missing dates between --start and --end
    #[arg(short, long)]
    pub range: bool,

    /// Archive every missing date from the first known edition to today
    #[arg(short, long, conflicts_with_all = ["start", "end"])]
    pub all: bool,

    /// First date of a --range (default: first known edition)
    #[arg(long, requires = "range")]
    pub start: Option<EditionDate>,

    /// Last date of a --range (default: today)
    #[arg(long, requires = "range")]
    pub end: Option<EditionDate>,

    /// Start from the most recent date already in the archive
    #[arg(long, conflicts_with = "date")]
    pub auto_start: bool,

    /// Fetch the most recent day(s) again even if already archived
    #[arg(long, conflicts_with = "date")]
    pub recheck_recent: bool,

    /// Number of trailing days covered by --recheck-recent
    #[arg(long, default_value_t = 1)]
    pub recheck_days: u32,

    /// Do not download page PDFs
    #[arg(long)]
    pub no_pdf: bool,

    /// Do not download page thumbnails
    #[arg(long)]
    pub no_thumbs: bool,

    /// Only download the front page (A01)
    #[arg(short, long)]
    pub front_page_only: bool,

    /// Archive root directory (overrides `out_dir` in the config file)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// The selected run mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single(EditionDate),
    Range {
        start: Option<EditionDate>,
        end: Option<EditionDate>,
    },
    All,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        match self.date {
            Some(date) => Mode::Single(date),
            None if self.range => Mode::Range {
                start: self.start,
                end: self.end,
            },
            None => Mode::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn d(s: &str) -> EditionDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_date_mode() {
        let cli = Cli::parse_from(["tablet_archiver", "--date", "20150520", "-f"]);
        assert_eq!(cli.mode(), Mode::Single(d("20150520")));
        assert!(cli.front_page_only);
        assert!(!cli.no_pdf);
        assert_eq!(cli.recheck_days, 1);
    }

    #[test]
    fn test_range_mode_with_bounds() {
        let cli = Cli::parse_from([
            "tablet_archiver",
            "--range",
            "--start",
            "20150520",
            "--end",
            "20150521",
            "--no-thumbs",
            "-o",
            "/tmp/out",
        ]);
        assert_eq!(
            cli.mode(),
            Mode::Range {
                start: Some(d("20150520")),
                end: Some(d("20150521")),
            }
        );
        assert!(cli.no_thumbs);
        assert_eq!(cli.out, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_all_mode_flags() {
        let cli = Cli::parse_from([
            "tablet_archiver",
            "-a",
            "--auto-start",
            "--recheck-recent",
            "--recheck-days",
            "3",
        ]);
        assert_eq!(cli.mode(), Mode::All);
        assert!(cli.auto_start && cli.recheck_recent);
        assert_eq!(cli.recheck_days, 3);
    }

    #[test]
    fn test_missing_mode_is_usage_error() {
        let err = Cli::try_parse_from(["tablet_archiver", "--no-pdf"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        let message = err.to_string();
        assert!(message.contains("--date") && message.contains("--range") && message.contains("--all"));
    }

    #[test]
    fn test_modes_are_exclusive() {
        let err = Cli::try_parse_from(["tablet_archiver", "--all", "--date", "20150520"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_invalid_date_rejected() {
        assert!(Cli::try_parse_from(["tablet_archiver", "--date", "2015-05-20"]).is_err());
    }

    #[test]
    fn test_range_flags_rejected_with_single_date() {
        for flag in ["--auto-start", "--recheck-recent"] {
            let err = Cli::try_parse_from(["tablet_archiver", "--date", "20150520", flag]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ArgumentConflict, "{flag}");
        }
    }
}
