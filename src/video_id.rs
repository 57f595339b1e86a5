//! Video identifier extraction from user-supplied YouTube URLs

use crate::error::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Length of a canonical YouTube video identifier
pub const VIDEO_ID_LEN: usize = 11;

/// Recognized URL shapes: short links, legacy `v/` and `/u/x/` paths, embeds,
/// live streams and the `v=` query parameter. The greedy prefix binds the
/// capture to the last marker in the string.
static VIDEO_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.*(?:youtu\.be/|v/|/u/\w/|embed/|live/|watch\?v=|&v=)([^#&?]*)")
        .expect("video URL pattern is valid")
});

/// Canonical 11-character video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Player URL used to embed the video
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}", self.0)
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the canonical identifier from an arbitrary string.
///
/// Returns `None` for anything that is not a recognized URL shape, and for
/// shapes whose identifier region (cut at the first `#`, `&` or `?`) is not
/// exactly [`VIDEO_ID_LEN`] characters of the identifier alphabet.
pub fn extract_video_id(url: &str) -> Option<VideoId> {
    let candidate = VIDEO_URL_PATTERN.captures(url)?.get(1)?.as_str();

    if candidate.chars().count() != VIDEO_ID_LEN || !candidate.chars().all(is_id_char) {
        debug!("Rejected identifier candidate {:?} from {:?}", candidate, url);
        return None;
    }

    Some(VideoId(candidate.to_string()))
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// A video as submitted by the user, with its derived identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReference {
    /// URL exactly as the user entered it
    pub raw_url: String,
    /// Identifier derived from `raw_url`, absent when extraction failed
    pub canonical_id: Option<VideoId>,
}

impl VideoReference {
    pub fn new(raw_url: impl Into<String>) -> Self {
        let raw_url = raw_url.into();
        let canonical_id = extract_video_id(&raw_url);
        Self { raw_url, canonical_id }
    }

    pub fn is_valid(&self) -> bool {
        self.canonical_id.is_some()
    }

    /// Resolve a raw URL, failing when no identifier can be extracted
    pub fn parse(raw_url: &str) -> Result<Self, ValidationError> {
        let reference = Self::new(raw_url.trim());
        if reference.is_valid() {
            Ok(reference)
        } else {
            Err(ValidationError::InvalidVideoUrl(raw_url.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    fn id_of(url: &str) -> Option<String> {
        extract_video_id(url).map(|id| id.as_str().to_string())
    }

    #[test]
    fn test_recognized_shapes() {
        let urls = [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ?version=3",
            "https://www.youtube.com/u/w/dQw4w9WgXcQ",
            "https://www.youtube.com/live/dQw4w9WgXcQ",
            "youtu.be/dQw4w9WgXcQ",
        ];

        for url in urls {
            assert_eq!(id_of(url).as_deref(), Some(ID), "url: {}", url);
        }
    }

    #[test]
    fn test_truncates_at_query_and_fragment() {
        assert_eq!(id_of("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=xyz").as_deref(), Some(ID));
        assert_eq!(id_of("https://youtu.be/dQw4w9WgXcQ?t=30").as_deref(), Some(ID));
        assert_eq!(id_of("https://www.youtube.com/embed/dQw4w9WgXcQ#start").as_deref(), Some(ID));
    }

    #[test]
    fn test_rejects_unrecognized_input() {
        assert_eq!(id_of("not a url"), None);
        assert_eq!(id_of("not-a-video"), None);
        assert_eq!(id_of(""), None);
        assert_eq!(id_of("https://vimeo.com/123456789"), None);
        assert_eq!(id_of("https://www.youtube.com/playlist?list=PLrAXtmRdnEQy"), None);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert_eq!(id_of("https://youtu.be/dQw4w9WgXc"), None);
        assert_eq!(id_of("https://youtu.be/dQw4w9WgXcQQ"), None);
        assert_eq!(id_of("https://www.youtube.com/watch?v="), None);
    }

    #[test]
    fn test_rejects_foreign_characters() {
        assert_eq!(id_of("https://youtu.be/dQw4w9 gXcQ"), None);
        assert_eq!(id_of("https://youtu.be/dQw4w9/XcQ"), None);
    }

    #[test]
    fn test_video_reference_parse() {
        let reference = VideoReference::parse("  https://youtu.be/dQw4w9WgXcQ ").unwrap();
        assert_eq!(reference.raw_url, "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(reference.canonical_id.unwrap().as_str(), ID);

        let err = VideoReference::parse("not-a-video").unwrap_err();
        assert_eq!(err, ValidationError::InvalidVideoUrl("not-a-video".to_string()));
    }

    #[test]
    fn test_invalid_reference_keeps_raw_url() {
        let reference = VideoReference::new("not a url");
        assert!(!reference.is_valid());
        assert_eq!(reference.raw_url, "not a url");
    }

    #[test]
    fn test_links() {
        let id = extract_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(id.embed_url(), "https://www.youtube.com/embed/dQw4w9WgXcQ");
        assert_eq!(id.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(id.to_string(), ID);
    }
}
