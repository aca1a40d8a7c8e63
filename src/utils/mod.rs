// src/utils/mod.rs

//! Small shared helpers.

use std::path::Path;

use unicode_segmentation::UnicodeSegmentation;

/// Derive a record filename from a URL: slashes become underscores, the
/// result is truncated to 250 graphemes to stay inside filesystem limits.
pub fn record_name(url: &str) -> String {
    let flattened = url.replace('/', "_");
    flattened.graphemes(true).take(250).collect()
}

/// Count regular files under a directory, recursively. A missing directory
/// counts as empty.
pub fn count_files(dir: impl AsRef<Path>) -> usize {
    fn walk(dir: &Path) -> usize {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return 0;
        };
        let mut count = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                count += walk(&path);
            } else {
                count += 1;
            }
        }
        count
    }
    walk(dir.as_ref())
}
