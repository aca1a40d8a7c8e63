// src/storage/tracking.rs

//! Append-only tracking logs under `<site>/resources/`.
//!
//! These six files are the recovery mechanism for an interrupted crawl:
//! every append opens the file, writes one line and closes it again, so a
//! crash between iterations never loses an acknowledged write.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// The tracking logs kept per site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Log {
    Visited,
    Queue,
    Error,
    Irrelevant,
    Forbidden,
    Graph,
}

impl Log {
    fn file_name(&self) -> &'static str {
        match self {
            Log::Visited => "visited.txt",
            Log::Queue => "queue.txt",
            Log::Error => "error.txt",
            Log::Irrelevant => "irrelevant.txt",
            Log::Forbidden => "forbidden.txt",
            Log::Graph => "graph.txt",
        }
    }
}

/// Handle on one site's tracking files.
#[derive(Debug, Clone)]
pub struct TrackingFiles {
    resources: PathBuf,
}

impl TrackingFiles {
    /// Tracking files for the site rooted at `site_root`.
    pub fn new(site_root: impl AsRef<Path>) -> Self {
        Self {
            resources: site_root.as_ref().join("resources"),
        }
    }

    /// Full path of one log file.
    pub fn path(&self, log: Log) -> PathBuf {
        self.resources.join(log.file_name())
    }

    /// Append a single line. The write is flushed before this returns.
    pub fn append(&self, log: Log, line: &str) -> Result<()> {
        let mut file = self.open_append(log)?;
        writeln!(file, "{line}")?;
        file.flush()?;
        Ok(())
    }

    /// Append many lines in one open/close cycle.
    pub fn append_lines<I, S>(&self, log: Log, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut file = self.open_append(log)?;
        for line in lines {
            writeln!(file, "{}", line.as_ref())?;
        }
        file.flush()?;
        Ok(())
    }

    /// Read a log back as a set of non-blank lines.
    ///
    /// A missing file is created empty and never treated as an error;
    /// this is what makes a first run on a fresh site directory work.
    pub fn read_all(&self, log: Log) -> Result<HashSet<String>> {
        let path = self.path(log);
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            File::create(&path)?;
            return Ok(HashSet::new());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn open_append(&self, log: Log) -> Result<File> {
        let path = self.path(log);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(OpenOptions::new().create(true).append(true).open(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn append_and_read_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let logs = TrackingFiles::new(tmp.path());

        logs.append(Log::Visited, "https://a.example/1").unwrap();
        logs.append(Log::Visited, "https://a.example/2").unwrap();

        let visited = logs.read_all(Log::Visited).unwrap();
        assert_eq!(visited.len(), 2);
        assert!(visited.contains("https://a.example/1"));
    }

    #[test]
    fn missing_log_reads_as_empty_and_is_created() {
        let tmp = TempDir::new().unwrap();
        let logs = TrackingFiles::new(tmp.path());

        assert!(logs.read_all(Log::Queue).unwrap().is_empty());
        assert!(logs.path(Log::Queue).exists());
    }

    #[test]
    fn blank_lines_are_dropped() {
        let tmp = TempDir::new().unwrap();
        let logs = TrackingFiles::new(tmp.path());
        std::fs::create_dir_all(tmp.path().join("resources")).unwrap();
        std::fs::write(logs.path(Log::Queue), "a\n\n  \nb\n").unwrap();

        let lines = logs.read_all(Log::Queue).unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn append_lines_writes_each_line() {
        let tmp = TempDir::new().unwrap();
        let logs = TrackingFiles::new(tmp.path());

        logs.append_lines(Log::Queue, ["x", "y", "z"]).unwrap();
        assert_eq!(logs.read_all(Log::Queue).unwrap().len(), 3);
    }
}
