// src/storage/scaffold.rs

//! Site directory scaffolding.

use std::fs::{self, OpenOptions};
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::MediaKind;
use crate::storage::{Log, TrackingFiles};

/// Create the on-disk layout for a new site directory.
///
/// Existing files and directories are left alone, so this is safe to re-run
/// on a site that has already been crawled. With `media` set the four media
/// directories and their empty indexes are created as well.
pub fn scaffold_site(site_root: impl AsRef<Path>, media: bool) -> Result<()> {
    let root = site_root.as_ref();
    if root.as_os_str().is_empty() {
        return Err(AppError::config("site directory name cannot be empty"));
    }

    fs::create_dir_all(root.join("article_pages"))?;
    fs::create_dir_all(root.join("nonarticle_pages"))?;
    fs::create_dir_all(root.join("resources"))?;

    let logs = TrackingFiles::new(root);
    for log in [
        Log::Visited,
        Log::Queue,
        Log::Error,
        Log::Irrelevant,
        Log::Forbidden,
        Log::Graph,
    ] {
        touch(&logs.path(log))?;
    }

    if media {
        let store = super::MediaStore::new(root);
        for kind in MediaKind::all() {
            fs::create_dir_all(store.dir(kind))?;
            touch(&store.index_path(kind))?;
        }
    }

    Ok(())
}

fn touch(path: &Path) -> Result<()> {
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(())
}
