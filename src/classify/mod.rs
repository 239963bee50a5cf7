//! Message classification.
//!
//! [`classify`] is the single place that decides how a message is presented:
//! whether it is an image, a transcript or long text, whether it collapses,
//! whether a summary is offered, and which video it links to. Every caller
//! (CLI, TUI, state) goes through it so they all agree.

pub mod video;

use serde::Serialize;

use crate::models::{Message, MessageType};
pub use video::{Thumbnail, ThumbnailState, extract_url, extract_video_id, find_video_url};

/// Text messages longer than this many characters are collapsed
pub const COLLAPSE_THRESHOLD_CHARS: usize = 800;
/// Text messages longer than this many characters offer a summary
pub const SUMMARY_THRESHOLD_CHARS: usize = 300;
/// Marker that identifies transcript content regardless of declared type
pub const TRANSCRIPT_MARKER: &str = "[Video Transcript]";

/// How a message is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    PlainText,
    Image,
    Transcript,
    LongText,
}

impl MessageKind {
    pub fn label(&self) -> &'static str {
        match self {
            MessageKind::PlainText => "text",
            MessageKind::Image => "image",
            MessageKind::Transcript => "transcript",
            MessageKind::LongText => "long text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub kind: MessageKind,
    pub is_image: bool,
    pub is_transcript: bool,
    pub is_long_text: bool,
    /// Content is hidden behind an expand action (long text or transcript)
    pub is_collapsible: bool,
    pub offers_summary: bool,
    pub video_id: Option<String>,
    pub thumbnail: Option<Thumbnail>,
}

/// Classify a message. Pure: the same message always yields the same result.
pub fn classify(message: &Message) -> Classification {
    let is_image = message.message_type == MessageType::Image;
    let is_transcript = is_transcript(message);
    let content_chars = message.content.chars().count();
    let is_text = message.message_type == MessageType::Text;

    let is_long_text = is_text && content_chars > COLLAPSE_THRESHOLD_CHARS;
    let offers_summary = is_transcript || (is_text && content_chars > SUMMARY_THRESHOLD_CHARS);

    let kind = if is_transcript {
        MessageKind::Transcript
    } else if is_image {
        MessageKind::Image
    } else if is_long_text {
        MessageKind::LongText
    } else {
        MessageKind::PlainText
    };

    let video_id = message.video_url().and_then(extract_video_id);
    let thumbnail = video_id.as_deref().map(Thumbnail::for_video);

    Classification {
        kind,
        is_image,
        is_transcript,
        is_long_text,
        is_collapsible: is_long_text || is_transcript,
        offers_summary,
        video_id,
        thumbnail,
    }
}

/// Declared transcript, or any message carrying the transcript marker
pub fn is_transcript(message: &Message) -> bool {
    message.message_type == MessageType::Transcript || message.content.contains(TRANSCRIPT_MARKER)
}
