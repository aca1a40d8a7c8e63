// src/pipeline/recovery.rs

//! Frontier reconstruction from the tracking logs.

use std::collections::HashSet;

use crate::error::Result;
use crate::models::SiteConfig;
use crate::services::classify;
use crate::storage::{Log, TrackingFiles};

/// Rebuild `(frontier, visited)` from a site's logs.
///
/// Queued lines are normalized, reduced to candidate shapes and stripped of
/// everything already visited. An empty result is seeded with the site's
/// base URL so a fresh directory starts crawling instead of failing.
pub fn restore_frontier(
    logs: &TrackingFiles,
    site: &SiteConfig,
) -> Result<(HashSet<String>, HashSet<String>)> {
    let visited = logs.read_all(Log::Visited)?;
    let queued = logs.read_all(Log::Queue)?;
    log::info!("Links to crawl in log: {}", queued.len());

    let normalized = classify::absolutize_all(queued, site);
    let mut frontier: HashSet<String> = normalized
        .into_iter()
        .filter(|url| site.is_candidate(url))
        .filter(|url| !visited.contains(url))
        .collect();
    log::info!(
        "Relevant links after exclusion and visited subtraction: {}",
        frontier.len()
    );

    if frontier.is_empty() {
        frontier.insert(format!("{}/", site.base_url));
    }

    Ok((frontier, visited))
}
