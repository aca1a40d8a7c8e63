// src/config.rs

//! Configuration loading utilities.
//!
//! This module loads the per-site pattern registry and the optional crawler
//! settings file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{SiteConfig, SitePatterns};

/// Load and compile the pattern entry for one site.
///
/// Fails with a configuration error when the file is unreadable, the site id
/// has no table, or a required pattern key is missing.
pub fn load_site(path: impl AsRef<Path>, site_id: &str) -> Result<SiteConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::config(format!("cannot read patterns file {path:?}: {e}")))?;
    let raw = parse_site(&content, site_id)?;
    SiteConfig::compile(raw)
}

/// Parse one site's raw pattern entry out of patterns-file content.
pub fn parse_site(content: &str, site_id: &str) -> Result<SitePatterns> {
    let mut table: HashMap<String, SitePatterns> = toml::from_str(content)
        .map_err(|e| AppError::config(format!("malformed patterns file: {e}")))?;
    table
        .remove(site_id)
        .ok_or_else(|| AppError::config(format!("no pattern entry for site '{site_id}'")))
}
