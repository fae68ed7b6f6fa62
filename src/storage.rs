//! On-disk archive layout.
//!
//! ```text
//! out/
//! └── 20150520/
//!     ├── tablet.json          # raw manifest, byte for byte
//!     ├── A01_20150520.pdf
//!     └── thumb/
//!         └── A01_20150520.jpg
//! ```
//!
//! Directories are created lazily and never removed. Every file is written
//! to a `.part` sibling first and renamed into place, so a file at its final
//! path is always complete.

use crate::models::EditionDate;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

pub const MANIFEST_FILE: &str = "tablet.json";
pub const THUMB_DIR: &str = "thumb";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    root: PathBuf,
}

impl ArchiveLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn date_dir(&self, date: &str) -> PathBuf {
        self.root.join(date)
    }

    pub fn manifest_path(&self, date: &str) -> PathBuf {
        self.date_dir(date).join(MANIFEST_FILE)
    }

    pub fn pdf_path(&self, date: &str, file: &str) -> PathBuf {
        self.date_dir(date).join(file)
    }

    pub fn thumb_path(&self, date: &str, file: &str) -> PathBuf {
        self.date_dir(date).join(THUMB_DIR).join(file)
    }

    /// Create the root, the date directory and optionally its `thumb`
    /// subdirectory. Existing directories are left alone.
    #[instrument(level = "debug", skip(self))]
    pub async fn init_date(&self, date: &str, with_thumbs: bool) -> io::Result<()> {
        let dir = self.date_dir(date);
        if with_thumbs {
            fs::create_dir_all(dir.join(THUMB_DIR)).await?;
        } else {
            fs::create_dir_all(&dir).await?;
        }
        debug!(dir = %dir.display(), "Archive directory ready");
        Ok(())
    }

    /// Write the manifest exactly as it was received.
    #[instrument(level = "debug", skip(self, raw), fields(bytes = raw.len()))]
    pub async fn save_manifest(&self, date: &str, raw: &[u8]) -> io::Result<PathBuf> {
        let path = self.manifest_path(date);
        write_atomic(&path, raw).await?;
        Ok(path)
    }

    /// Dates already present under the root: directory names of exactly
    /// eight digits that form a valid date. A missing root is created and
    /// reported as an empty archive.
    #[instrument(level = "info", skip(self), fields(root = %self.root.display()))]
    pub async fn archived_dates(&self) -> io::Result<BTreeSet<EditionDate>> {
        fs::create_dir_all(&self.root).await?;

        let mut dates = BTreeSet::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if let Some(date) = entry.file_name().to_str().and_then(EditionDate::from_dir_name) {
                dates.insert(date);
            }
        }

        info!(count = dates.len(), "Scanned archive");
        Ok(dates)
    }
}

/// Write `bytes` to `path` through a `.part` sibling and a rename.
///
/// The parent directory is created if needed. On failure the partial file is
/// removed and nothing appears at `path`.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    if let Err(e) = fs::write(&part, bytes).await {
        let _ = fs::remove_file(&part).await;
        return Err(e);
    }
    fs::rename(&part, path).await
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory, then creates and removes a scratch file in it.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    let scratch = path.join(".write_check");
    fs::write(&scratch, b"").await?;
    let _ = fs::remove_file(&scratch).await;
    info!("Archive root is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_layout_paths() {
        let layout = ArchiveLayout::new("out");
        assert_eq!(layout.manifest_path("20150520"), Path::new("out/20150520/tablet.json"));
        assert_eq!(layout.pdf_path("20150520", "A01.pdf"), Path::new("out/20150520/A01.pdf"));
        assert_eq!(
            layout.thumb_path("20150520", "A01.jpg"),
            Path::new("out/20150520/thumb/A01.jpg")
        );
    }

    #[tokio::test]
    async fn test_init_date_is_idempotent() {
        let tmp = tempdir().unwrap();
        let layout = ArchiveLayout::new(tmp.path().join("out"));

        layout.init_date("20150520", true).await.unwrap();
        layout.init_date("20150520", true).await.unwrap();

        assert!(layout.date_dir("20150520").join(THUMB_DIR).is_dir());
    }

    #[tokio::test]
    async fn test_init_date_without_thumbs() {
        let tmp = tempdir().unwrap();
        let layout = ArchiveLayout::new(tmp.path());

        layout.init_date("20150520", false).await.unwrap();

        assert!(layout.date_dir("20150520").is_dir());
        assert!(!layout.date_dir("20150520").join(THUMB_DIR).exists());
    }

    #[tokio::test]
    async fn test_save_manifest_verbatim() {
        let tmp = tempdir().unwrap();
        let layout = ArchiveLayout::new(tmp.path());
        let raw = br#"{ "sections" : { "pubdate": "20150520" } , "extra": [1, 2] }"#;

        let path = layout.save_manifest("20150520", raw).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), raw.to_vec());
        assert!(!path.with_extension("json.part").exists());
    }

    #[tokio::test]
    async fn test_archived_dates_filters_entries() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("out");
        for dir in ["20150520", "20150601", "notes", "2015052", "20151340"] {
            std::fs::create_dir_all(root.join(dir)).unwrap();
        }
        std::fs::write(root.join("20150521"), b"file, not a dir").unwrap();

        let dates = ArchiveLayout::new(&root).archived_dates().await.unwrap();

        let names: Vec<String> = dates.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["20150520", "20150601"]);
    }

    #[tokio::test]
    async fn test_archived_dates_creates_missing_root() {
        let tmp = tempdir().unwrap();
        let layout = ArchiveLayout::new(tmp.path().join("fresh"));

        assert!(layout.archived_dates().await.unwrap().is_empty());
        assert!(layout.root().is_dir());
    }

    #[tokio::test]
    async fn test_ensure_writable_dir() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("nested/out");

        ensure_writable_dir(&dir).await.unwrap();

        assert!(dir.is_dir());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    }
}
