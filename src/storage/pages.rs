// src/storage/pages.rs

//! Write-once page record storage.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::PageRecord;
use crate::utils::record_name;

/// Target directories for stored pages.
///
/// Newer site directories use `article_pages`/`nonarticle_pages`; some older
/// corpora still carry `page_contents`/`board_pages`, which is detected and
/// reused so a resumed crawl keeps writing where the first run did.
#[derive(Debug, Clone)]
pub struct GoalDirs {
    pub article: PathBuf,
    pub nonarticle: PathBuf,
}

impl GoalDirs {
    /// Current layout under `site_root`.
    pub fn new(site_root: impl AsRef<Path>) -> Self {
        let root = site_root.as_ref();
        Self {
            article: root.join("article_pages"),
            nonarticle: root.join("nonarticle_pages"),
        }
    }

    /// Legacy layout under `site_root`.
    pub fn legacy(site_root: impl AsRef<Path>) -> Self {
        let root = site_root.as_ref();
        Self {
            article: root.join("page_contents"),
            nonarticle: root.join("board_pages"),
        }
    }

    /// Pick the legacy layout when its directories already exist.
    pub fn detect(site_root: impl AsRef<Path>) -> Self {
        let root = site_root.as_ref();
        if root.join("page_contents").is_dir() {
            Self::legacy(root)
        } else {
            Self::new(root)
        }
    }
}

/// Stores fetched pages as one JSON record per URL.
#[derive(Debug, Clone)]
pub struct PageStore {
    dirs: GoalDirs,
}

impl PageStore {
    pub fn new(dirs: GoalDirs) -> Self {
        Self { dirs }
    }

    /// Store an article page. Returns the record path.
    pub fn write_article(&self, url: &str, html: &str) -> Result<PathBuf> {
        self.write_record(&self.dirs.article, url, html)
    }

    /// Store a board/listing page. Returns the record path.
    pub fn write_board(&self, url: &str, html: &str) -> Result<PathBuf> {
        self.write_record(&self.dirs.nonarticle, url, html)
    }

    /// Write one record, refusing to clobber an existing file: a colliding
    /// path means a re-crawl or non-unique naming, and either way the stored
    /// data must survive.
    fn write_record(&self, dir: &Path, url: &str, html: &str) -> Result<PathBuf> {
        let path = dir.join(format!("{}.json", record_name(url)));
        if path.exists() {
            return Err(AppError::DuplicateRecord { path });
        }

        let record = PageRecord {
            url: url.to_string(),
            time_crawled: Utc::now().to_rfc3339(),
            html_content: html.to_string(),
        };

        fs::create_dir_all(dir)?;
        fs::write(&path, serde_json::to_string(&record)?)?;
        Ok(path)
    }
}
