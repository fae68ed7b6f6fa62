//! Core value types shared by the range calculator, parser and downloader.
//!
//! - [`EditionDate`]: a calendar day addressed as an 8-digit `YYYYMMDD` key
//! - [`PageRecord`]: one page of an edition with its PDF and thumbnail names

use chrono::{Local, NaiveDate};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned when a string is not a valid `YYYYMMDD` calendar date.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid edition date {0:?}: expected YYYYMMDD")]
pub struct DateError(pub String);

/// A single edition day.
///
/// Remote URLs and local directory names both use the zero-padded
/// `YYYYMMDD` form produced by [`fmt::Display`]; arithmetic and ordering go
/// through the wrapped [`NaiveDate`]. There is no timezone component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditionDate(NaiveDate);

impl EditionDate {
    /// The earliest day for which the remote edition archive has files.
    pub const FIRST_KNOWN: &'static str = "20150520";

    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today's date on the local clock.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Parse an archive directory name, returning `None` for anything that is
    /// not exactly eight digits forming a real calendar date.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }
}

impl FromStr for EditionDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DateError(s.to_string()));
        }
        NaiveDate::parse_from_str(s, "%Y%m%d")
            .map(Self)
            .map_err(|_| DateError(s.to_string()))
    }
}

impl fmt::Display for EditionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

/// Which of a page's two assets is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Pdf,
    Thumbnail,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Pdf => f.write_str("pdf"),
            AssetKind::Thumbnail => f.write_str("thumbnail"),
        }
    }
}

/// One page of an edition as listed in its manifest.
///
/// Records are derived from a manifest on every run and never stored on
/// their own. `date` is the manifest's publication date, which keys both the
/// remote asset URLs and the local save directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// Publication date as written in the manifest (`YYYYMMDD`).
    pub date: String,
    /// Page label, e.g. `"A01"`.
    pub page_name: String,
    /// File name of the high resolution PDF (`hires_pdf`).
    pub pdf: Option<String>,
    /// File name of the 300px thumbnail (`thumb_300`).
    pub thumb: Option<String>,
}

impl PageRecord {
    /// The remote file name for `kind`, if the manifest listed one.
    pub fn file(&self, kind: AssetKind) -> Option<&str> {
        match kind {
            AssetKind::Pdf => self.pdf.as_deref(),
            AssetKind::Thumbnail => self.thumb.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_round_trip_zero_padding() {
        let date: EditionDate = "20150520".parse().unwrap();
        assert_eq!(date.as_naive(), NaiveDate::from_ymd_opt(2015, 5, 20).unwrap());
        assert_eq!(date.to_string(), "20150520");

        let jan = EditionDate::new(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
        assert_eq!(jan.to_string(), "20200102");
    }

    #[test]
    fn test_rejects_malformed_dates() {
        for bad in ["2015052", "201505201", "2015-05-20", "20150231", "abcdefgh", ""] {
            assert_eq!(
                bad.parse::<EditionDate>(),
                Err(DateError(bad.to_string())),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_dir_name_ignores_other_entries() {
        assert!(EditionDate::from_dir_name("20160101").is_some());
        assert!(EditionDate::from_dir_name("tablet.json").is_none());
        assert!(EditionDate::from_dir_name("thumb").is_none());
        assert!(EditionDate::from_dir_name("99999999").is_none());
    }

    #[test]
    fn test_page_record_file_by_kind() {
        let record = PageRecord {
            date: "20150520".into(),
            page_name: "A01".into(),
            pdf: Some("A01.pdf".into()),
            thumb: None,
        };
        assert_eq!(record.file(AssetKind::Pdf), Some("A01.pdf"));
        assert_eq!(record.file(AssetKind::Thumbnail), None);
    }
}
