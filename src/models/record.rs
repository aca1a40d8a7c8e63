// src/models/record.rs

//! Persisted artifacts: page records and media kinds.

use serde::{Deserialize, Serialize};

/// Stored page record, one JSON file per page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// Original URL of the page
    pub url: String,

    /// Fetch timestamp, ISO-8601
    pub time_crawled: String,

    /// Raw page content as fetched
    pub html_content: String,
}

/// Media types the indexed-media crawl dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Pdf,
    Video,
    Audio,
}

impl MediaKind {
    /// Guess the media kind and file extension from the URL alone.
    ///
    /// Returns `None` for anything that is not an image, PDF, video or
    /// audio resource.
    pub fn guess(url: &str) -> Option<(MediaKind, String)> {
        let mime = mime_guess::from_path(url).first()?;
        let extension = mime.subtype().as_str().to_string();
        let kind = match (mime.type_().as_str(), mime.subtype().as_str()) {
            ("image", _) => MediaKind::Image,
            ("application", "pdf") => MediaKind::Pdf,
            ("video", _) => MediaKind::Video,
            ("audio", _) => MediaKind::Audio,
            _ => return None,
        };
        Some((kind, extension))
    }

    /// Directory name for this kind under the site root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Pdf => "pdfs",
            MediaKind::Video => "videos",
            MediaKind::Audio => "audios",
        }
    }

    /// All kinds, in index-file order.
    pub fn all() -> [MediaKind; 4] {
        [
            MediaKind::Image,
            MediaKind::Pdf,
            MediaKind::Video,
            MediaKind::Audio,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_common_media_types() {
        assert_eq!(
            MediaKind::guess("https://x.example/a/photo.jpg"),
            Some((MediaKind::Image, "jpeg".to_string()))
        );
        assert_eq!(
            MediaKind::guess("https://x.example/paper.pdf"),
            Some((MediaKind::Pdf, "pdf".to_string()))
        );
        assert_eq!(
            MediaKind::guess("https://x.example/clip.mp4"),
            Some((MediaKind::Video, "mp4".to_string()))
        );
    }

    #[test]
    fn guess_rejects_pages_and_unknowns() {
        assert!(MediaKind::guess("https://x.example/page.html").is_none());
        assert!(MediaKind::guess("https://x.example/no-extension").is_none());
    }
}
