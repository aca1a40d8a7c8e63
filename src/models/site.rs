// src/models/site.rs

//! Per-site URL patterns and their compiled form.

use regex::Regex;
use serde::Deserialize;

use crate::error::{AppError, Result};

/// Raw per-site pattern entry as it appears in the patterns file.
#[derive(Debug, Clone, Deserialize)]
pub struct SitePatterns {
    /// Site base URL, no trailing slash
    pub base_url: String,

    /// Anchored pattern identifying article pages
    pub article_url: String,

    /// Anchored pattern identifying board/listing pages
    pub board_url: String,

    /// Search-anywhere pattern excluding a URL outright
    pub irrelevant_url: String,

    /// Sub-path prepended to `./`-relative links (forum installations)
    #[serde(default = "default_forum_root")]
    pub forum_root: String,
}

fn default_forum_root() -> String {
    "/phpbb".into()
}

/// Shape-based category of a single URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlCategory {
    Article,
    Board,
    Irrelevant,
}

/// Compiled site configuration.
///
/// Article and board patterns match at the start of the URL; the irrelevant
/// pattern matches anywhere. The distinction is load-bearing: a URL must
/// *start with* an article/board shape but may be excluded by an irrelevant
/// substring at any position.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: String,
    pub forum_root: String,
    article: Regex,
    board: Regex,
    irrelevant: Regex,
}

impl SiteConfig {
    /// Compile raw patterns into matchers.
    pub fn compile(raw: SitePatterns) -> Result<Self> {
        let article = anchored(&raw.article_url)?;
        let board = anchored(&raw.board_url)?;
        let irrelevant = Regex::new(&raw.irrelevant_url).map_err(|e| {
            AppError::config(format!("invalid irrelevant_url pattern: {e}"))
        })?;

        Ok(Self {
            base_url: raw.base_url.trim_end_matches('/').to_string(),
            forum_root: raw.forum_root,
            article,
            board,
            irrelevant,
        })
    }

    /// Scheme prefix of the base URL (e.g. `https`), used by the normalizer.
    pub fn scheme(&self) -> &str {
        self.base_url
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .unwrap_or("https")
    }

    /// Whether the URL starts with an article or board shape and carries no
    /// irrelevant marker.
    pub fn is_candidate(&self, url: &str) -> bool {
        (self.article.is_match(url) || self.board.is_match(url))
            && !self.irrelevant.is_match(url)
    }

    /// Classify a URL by shape alone. Article wins over board when both
    /// patterns match.
    pub fn classify(&self, url: &str) -> UrlCategory {
        if self.article.is_match(url) {
            UrlCategory::Article
        } else if self.board.is_match(url) {
            UrlCategory::Board
        } else {
            UrlCategory::Irrelevant
        }
    }
}

fn anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})"))
        .map_err(|e| AppError::config(format!("invalid URL pattern '{pattern}': {e}")))
}
