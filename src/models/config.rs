//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Crawling behavior settings.
///
/// Loaded from an optional TOML file; every field has a default so a missing
/// file means "run with defaults".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Static fetch timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// CSS selector the rendered DOM must contain before extraction
    #[serde(default = "defaults::render_selector")]
    pub render_selector: String,

    /// Bounded wait for the render selector, in milliseconds
    #[serde(default = "defaults::render_timeout")]
    pub render_timeout_ms: u64,

    /// Lower bound of the politeness delay between page fetches, seconds
    #[serde(default = "defaults::min_delay")]
    pub min_delay_secs: f64,

    /// Upper bound of the politeness delay between page fetches, seconds
    #[serde(default = "defaults::max_delay")]
    pub max_delay_secs: f64,

    /// Lower bound of the politeness delay for media downloads, seconds
    #[serde(default = "defaults::media_min_delay")]
    pub media_min_delay_secs: f64,

    /// Upper bound of the politeness delay for media downloads, seconds
    #[serde(default = "defaults::media_max_delay")]
    pub media_max_delay_secs: f64,

    /// Worker count for offline corpus extraction
    #[serde(default = "defaults::extract_concurrency")]
    pub extract_concurrency: usize,
}

impl CrawlerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return defaults if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.user_agent.trim().is_empty() {
            return Err(AppError::config("user_agent is empty"));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::config("timeout_secs must be > 0"));
        }
        if self.min_delay_secs < 0.0 || self.min_delay_secs > self.max_delay_secs {
            return Err(AppError::config(
                "delay range must satisfy 0 <= min <= max",
            ));
        }
        if self.media_min_delay_secs < 0.0 || self.media_min_delay_secs > self.media_max_delay_secs
        {
            return Err(AppError::config(
                "media delay range must satisfy 0 <= min <= max",
            ));
        }
        if self.extract_concurrency == 0 {
            return Err(AppError::config("extract_concurrency must be > 0"));
        }
        Ok(())
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            render_selector: defaults::render_selector(),
            render_timeout_ms: defaults::render_timeout(),
            min_delay_secs: defaults::min_delay(),
            max_delay_secs: defaults::max_delay(),
            media_min_delay_secs: defaults::media_min_delay(),
            media_max_delay_secs: defaults::media_max_delay(),
            extract_concurrency: defaults::extract_concurrency(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; corpus-crawler/0.1)".into()
    }
    pub fn timeout() -> u64 {
        20
    }
    pub fn render_selector() -> String {
        "body".into()
    }
    pub fn render_timeout() -> u64 {
        10_000
    }
    pub fn min_delay() -> f64 {
        3.0
    }
    pub fn max_delay() -> f64 {
        7.0
    }
    pub fn media_min_delay() -> f64 {
        5.0
    }
    pub fn media_max_delay() -> f64 {
        10.0
    }
    pub fn extract_concurrency() -> usize {
        8
    }
}
