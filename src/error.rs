// src/error.rs

//! Unified error handling for the crawler application.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Site pattern or crawler configuration is missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// The frontier is empty and no seed could be recovered
    #[error("No links to crawl")]
    NoLinks,

    /// Network or status failure while fetching one URL
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Headless rendering exceeded its bounded wait
    #[error("Render timeout for {url}: selector '{selector}' never appeared")]
    RenderTimeout { url: String, selector: String },

    /// A page or media record would overwrite an existing file
    #[error("Record already exists at {path}")]
    DuplicateRecord { path: PathBuf },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Media index read/write failed
    #[error("Index error: {0}")]
    Csv(#[from] csv::Error),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a fetch error for a URL, wrapping any transport failure.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }
}
