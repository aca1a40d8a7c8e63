// src/storage/media.rs

//! Indexed media storage.
//!
//! Each media type keeps its own directory with an `_index_.csv` of
//! `url, timestamp, stored_filename` rows. The URL column across the four
//! indexes is the dedup authority for the media crawl: there is no separate
//! visited log to replay, the indexes themselves say what was handled.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::MediaKind;
use crate::utils::count_files;

const INDEX_FILE: &str = "_index_.csv";

/// Per-site media directories and their indexes.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(site_root: impl AsRef<Path>) -> Self {
        Self {
            root: site_root.as_ref().to_path_buf(),
        }
    }

    /// Directory for one media kind.
    pub fn dir(&self, kind: MediaKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Index file for one media kind.
    pub fn index_path(&self, kind: MediaKind) -> PathBuf {
        self.dir(kind).join(INDEX_FILE)
    }

    /// Number of stored files for one kind, the index file excluded. Used to
    /// seed the engine's sequence counters on startup.
    pub fn stored_count(&self, kind: MediaKind) -> usize {
        let dir = self.dir(kind);
        let total = count_files(&dir);
        if self.index_path(kind).exists() {
            total.saturating_sub(1)
        } else {
            total
        }
    }

    /// URLs already recorded in one kind's index. Malformed rows are
    /// dropped, a missing index reads as empty.
    pub fn indexed_urls(&self, kind: MediaKind) -> Result<HashSet<String>> {
        let path = self.index_path(kind);
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(HashSet::new());
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut urls = HashSet::new();
        for record in reader.records() {
            let Ok(record) = record else { continue };
            if let Some(url) = record.get(0) {
                if !url.is_empty() {
                    urls.insert(url.to_string());
                }
            }
        }
        Ok(urls)
    }

    /// Union of the four per-kind index URL sets.
    pub fn all_indexed_urls(&self) -> Result<HashSet<String>> {
        let mut urls = HashSet::new();
        for kind in MediaKind::all() {
            urls.extend(self.indexed_urls(kind)?);
        }
        Ok(urls)
    }

    /// Store one media file as `<sequence>.<extension>`, write-once.
    /// Returns the stored filename.
    pub fn save(
        &self,
        kind: MediaKind,
        sequence: usize,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String> {
        let name = format!("{sequence}.{extension}");
        let dir = self.dir(kind);
        let path = dir.join(&name);
        if path.exists() {
            return Err(AppError::DuplicateRecord { path });
        }
        fs::create_dir_all(&dir)?;
        fs::write(&path, bytes)?;
        Ok(name)
    }

    /// Append one `url, timestamp, stored_filename` row to the kind's index.
    pub fn append_index(&self, kind: MediaKind, url: &str, stored: &str) -> Result<()> {
        let dir = self.dir(kind);
        fs::create_dir_all(&dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.index_path(kind))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Always)
            .from_writer(file);
        let timestamp = Utc::now().to_rfc3339();
        writer.write_record([url, timestamp.as_str(), stored])?;
        writer.flush()?;
        Ok(())
    }
}
