// src/services/corpus.rs

//! Offline extraction over an already-stored corpus.
//!
//! The only parallel part of the system: per-file parsing is read-only and
//! independent, so it fans out across blocking workers and the results are
//! merged into one set at the join point. Unreadable or malformed records
//! are skipped, matching the tolerance of the recovery logs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::PageRecord;
use crate::services::extract;

/// What to pull out of each stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    Links,
    Images,
}

/// Extract all unique links or image sources from every `.json` record in a
/// corpus directory, `concurrency` files at a time.
pub async fn extract_from_corpus(
    corpus_dir: impl AsRef<Path>,
    what: Extraction,
    concurrency: usize,
) -> Result<HashSet<String>> {
    let files = record_files(corpus_dir.as_ref())?;
    log::info!("Extracting from {} corpus records", files.len());

    let results = stream::iter(files)
        .map(|path| {
            tokio::task::spawn_blocking(move || extract_from_record(&path, what))
        })
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

    let mut merged = HashSet::new();
    for joined in results {
        if let Ok(set) = joined {
            merged.extend(set);
        }
    }
    Ok(merged)
}

fn record_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(files)
}

fn extract_from_record(path: &Path, what: Extraction) -> HashSet<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        log::warn!("Skipping unreadable record {path:?}");
        return HashSet::new();
    };
    let Ok(record) = serde_json::from_str::<PageRecord>(&content) else {
        log::warn!("Skipping malformed record {path:?}");
        return HashSet::new();
    };
    match what {
        Extraction::Links => extract::links_from_html(&record.html_content),
        Extraction::Images => extract::images_from_html(&record.html_content),
    }
}
