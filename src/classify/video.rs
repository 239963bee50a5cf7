//! Video link handling: identifier extraction, URL discovery in free text,
//! and thumbnail URLs with a single lower-resolution fallback.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Base path of the thumbnail image host
pub const THUMBNAIL_HOST: &str = "https://img.youtube.com/vi";
const THUMBNAIL_PRIMARY: &str = "hqdefault.jpg";
const THUMBNAIL_FALLBACK: &str = "mqdefault.jpg";

static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:v=|youtu\.be/|embed/)([A-Za-z0-9_-]+)").expect("valid video id regex")
});

static YOUTUBE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https?://(?:www\.)?(?:youtube\.com/(?:watch\?v=|embed/)|youtu\.be/)([A-Za-z0-9_-]+)",
    )
    .expect("valid youtube url regex")
});

static URL_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"URL:\s*(https?://\S+)").expect("valid url line regex"));

static ANY_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://\S+|www\.[A-Za-z0-9][A-Za-z0-9-]+[A-Za-z0-9]\.\S{2,}")
        .expect("valid url regex")
});

/// Extract the video identifier from a video URL
///
/// Looks for the first `v=`, `youtu.be/` or `embed/` segment.
///
/// ```
/// use chat_archive_explorer::classify::video::extract_video_id;
///
/// assert_eq!(extract_video_id("https://youtu.be/abc123").as_deref(), Some("abc123"));
/// assert_eq!(extract_video_id("https://example.com/clip"), None);
/// ```
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_RE.captures(url).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
}

/// Find a YouTube link in free text and normalize it to a watch URL
///
/// Falls back to an explicit `URL:` token; non-video URLs behind `URL:` are
/// returned unchanged.
pub fn find_video_url(text: &str) -> Option<String> {
    if let Some(caps) = YOUTUBE_URL_RE.captures(text) {
        return Some(watch_url(&caps[1]));
    }

    let idx = text.find("URL:")?;
    let candidate = text[idx + 4..].split_whitespace().next()?;
    if !candidate.contains("http") {
        return None;
    }
    match extract_video_id(candidate) {
        Some(id) => Some(watch_url(&id)),
        None => Some(candidate.to_string()),
    }
}

/// Find the first URL in free text, preferring an explicit `URL:` line
pub fn extract_url(text: &str) -> Option<String> {
    if let Some(caps) = URL_LINE_RE.captures(text) {
        return Some(caps[1].to_string());
    }
    ANY_URL_RE.find(text).map(|m| m.as_str().to_string())
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Thumbnail locations for one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    /// High-quality image, tried first
    pub primary: String,
    /// Medium-quality image, tried once after the primary fails
    pub fallback: String,
}

impl Thumbnail {
    pub fn for_video(video_id: &str) -> Self {
        Self {
            primary: format!("{}/{}/{}", THUMBNAIL_HOST, video_id, THUMBNAIL_PRIMARY),
            fallback: format!("{}/{}/{}", THUMBNAIL_HOST, video_id, THUMBNAIL_FALLBACK),
        }
    }

    /// URL to display for the given load state, `None` once the image is hidden
    pub fn url(&self, state: ThumbnailState) -> Option<&str> {
        match state {
            ThumbnailState::Primary => Some(&self.primary),
            ThumbnailState::Fallback => Some(&self.fallback),
            ThumbnailState::Hidden => None,
        }
    }

    /// URL to try after `current` failed to load: the fallback once, then nothing
    pub fn next_after_failure(&self, current: &str) -> Option<&str> {
        if current == self.primary { Some(&self.fallback) } else { None }
    }
}

/// Load progression for a thumbnail: primary, then fallback, then hidden
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThumbnailState {
    #[default]
    Primary,
    Fallback,
    Hidden,
}

impl ThumbnailState {
    /// Next state after the current URL failed to load
    pub fn on_load_failure(self) -> Self {
        match self {
            ThumbnailState::Primary => ThumbnailState::Fallback,
            ThumbnailState::Fallback | ThumbnailState::Hidden => ThumbnailState::Hidden,
        }
    }
}
