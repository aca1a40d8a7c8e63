// src/pipeline/media.rs

//! The indexed-media crawl engine.
//!
//! Dispatches by guessed MIME type instead of URL shape and uses the four
//! per-type index files as its dedup authority: a URL present in any index
//! is already handled, no separate visited log needs replaying.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::MediaKind;
use crate::pipeline::{continue_crawling, pop_any};
use crate::services::fetch::PageFetcher;
use crate::services::politeness::DelayRange;
use crate::storage::{Log, MediaStore, TrackingFiles};

/// Per-kind sequence counters, owned by the engine and threaded into the
/// storage calls. Seeded from the files already on disk so a resumed crawl
/// keeps numbering where the last run stopped.
#[derive(Debug, Clone, Copy, Default)]
struct MediaCounters {
    image: usize,
    pdf: usize,
    video: usize,
    audio: usize,
}

impl MediaCounters {
    fn from_store(store: &MediaStore) -> Self {
        Self {
            image: store.stored_count(MediaKind::Image),
            pdf: store.stored_count(MediaKind::Pdf),
            video: store.stored_count(MediaKind::Video),
            audio: store.stored_count(MediaKind::Audio),
        }
    }

    /// Advance one kind's counter and return the new sequence number.
    fn next(&mut self, kind: MediaKind) -> usize {
        let counter = match kind {
            MediaKind::Image => &mut self.image,
            MediaKind::Pdf => &mut self.pdf,
            MediaKind::Video => &mut self.video,
            MediaKind::Audio => &mut self.audio,
        };
        *counter += 1;
        *counter
    }
}

/// Sequential media download loop over one site.
pub struct MediaEngine {
    logs: TrackingFiles,
    store: MediaStore,
    fetcher: Box<dyn PageFetcher>,
    delay: DelayRange,
    counters: MediaCounters,
    frontier: HashSet<String>,
    visited: HashSet<String>,
}

impl MediaEngine {
    pub fn new(
        site_root: impl AsRef<Path>,
        fetcher: Box<dyn PageFetcher>,
        delay: DelayRange,
    ) -> Result<Self> {
        let site_root = site_root.as_ref();
        let logs = TrackingFiles::new(site_root);
        let store = MediaStore::new(site_root);

        let handled = store.all_indexed_urls()?;
        let queued = logs.read_all(Log::Queue)?;
        let frontier: HashSet<String> =
            queued.into_iter().filter(|url| !handled.contains(url)).collect();
        let counters = MediaCounters::from_store(&store);

        Ok(Self {
            logs,
            store,
            fetcher,
            delay,
            counters,
            frontier,
            visited: handled,
        })
    }

    pub fn frontier(&self) -> &HashSet<String> {
        &self.frontier
    }

    fn ready_to_crawl(&self) -> Result<()> {
        if self.frontier.is_empty() {
            return Err(AppError::NoLinks);
        }
        if self.visited.is_empty() {
            log::warn!("No indexed media on record. Fresh crawl?");
        }
        Ok(())
    }

    /// Run the download loop until the frontier drains or `max_pages` is
    /// reached.
    pub async fn run(&mut self, max_pages: Option<usize>) -> Result<()> {
        self.ready_to_crawl()?;

        let mut pages_done = 0usize;
        while continue_crawling(max_pages, pages_done, self.frontier.len()) {
            let Some(url) = pop_any(&mut self.frontier) else {
                break;
            };
            pages_done += 1;

            self.logs.append(Log::Visited, &url)?;
            self.visited.insert(url.clone());
            log::info!("{pages_done}: {url}");

            if let Err(error) = self.step(&url).await {
                log::warn!("Skipping {url}: {error}");
                self.logs.append(Log::Error, &url)?;
                self.delay.wait().await;
            }
        }

        self.logs
            .append(Log::Graph, &self.frontier.len().to_string())?;
        Ok(())
    }

    async fn step(&mut self, url: &str) -> Result<()> {
        let Some((kind, extension)) = MediaKind::guess(url) else {
            return Err(AppError::fetch(url, "unrecognized media type"));
        };

        let bytes = self.fetcher.fetch_bytes(url).await?;
        let sequence = self.counters.next(kind);
        let stored = self.store.save(kind, sequence, &extension, &bytes)?;
        self.store.append_index(kind, url, &stored)?;

        self.logs
            .append(Log::Graph, &self.frontier.len().to_string())?;
        self.delay.wait().await;
        Ok(())
    }
}
