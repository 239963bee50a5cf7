//! Importer for WhatsApp-style chat exports (`_chat.txt`).
//!
//! The export is a chat log optionally followed by transcript blocks, each
//! block introduced by a line of 64 `=` characters:
//!
//! ```text
//! [9/28/25, 5:59:40 PM] Amy: look at this https://youtu.be/abc123
//! [9/28/25, 6:01:02 PM] Bob: <attached: 00000012-PHOTO-2025-09-28.jpg>
//! ================================================================
//! [Video Transcript] Morning routine
//! URL: https://youtu.be/abc123
//! so today we talk about ...
//! ```
//!
//! Chat lines become text or image messages; lines that do not start with a
//! timestamp continue the previous message. Transcript blocks are attached right
//! after the message that shared the same video. The result is sorted by time
//! and grouped into `MM/DD/YYYY` days.
//!
//! Malformed lines are skipped with a warning rather than failing the import.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use regex::Regex;
use tracing::{debug, warn};

use crate::classify::{TRANSCRIPT_MARKER, extract_video_id, find_video_url};
use crate::models::{Message, MessageType, Timeline, TimelineDay};
use crate::utils::{MAX_EXPORT_SIZE_BYTES, validate_file_size};

/// Line that separates the chat log from transcript blocks
pub const TRANSCRIPT_SEPARATOR: &str =
    "================================================================";
/// Sender recorded on attached transcript messages
pub const TRANSCRIPT_SENDER: &str = "Archive Bot";
/// Time label recorded on attached transcript messages
pub const TRANSCRIPT_TIME_LABEL: &str = "Transcript";
/// Date label format of timeline days
pub const DATE_KEY_FORMAT: &str = "%m/%d/%Y";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov"];
const STATIC_PREFIX: &str = "/static/";

// Month-first is the export default, day-first is the fallback
const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%d/%m/%y %I:%M:%S %p",
    "%d/%m/%Y %I:%M:%S %p",
];

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[(\d{1,2}/\d{1,2}/\d{2,4}),\s*(\d{1,2}:\d{2}:\d{2}\s*[APap][Mm])\]\s*(.*?):\s*(.*)$",
    )
    .expect("valid chat line regex")
});

static ATTACHMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<attached:\s*(.*?)>").expect("valid attachment regex"));

static MEMBER_ADDED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"added \+?\d+").expect("valid member regex"));

/// Counters reported after an import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub days: usize,
    pub messages: usize,
    pub images: usize,
    pub videos: usize,
    pub video_files: usize,
    pub transcripts_attached: usize,
    pub transcripts_orphaned: usize,
    pub system_skipped: usize,
    pub unparseable: usize,
}

#[derive(Debug, Clone)]
pub struct ChatImport {
    pub timeline: Timeline,
    pub stats: ImportStats,
}

struct Draft {
    at: NaiveDateTime,
    message: Message,
}

/// Read and import a chat export file
pub fn parse_chat_export_file(path: &Path) -> Result<ChatImport> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open chat export: {}", path.display()))?;
    validate_file_size(&file, path, MAX_EXPORT_SIZE_BYTES)?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .with_context(|| format!("Failed to read chat export: {}", path.display()))?;

    Ok(parse_chat_export(&content))
}

/// Import a chat export held in memory
pub fn parse_chat_export(content: &str) -> ChatImport {
    let mut stats = ImportStats::default();
    let mut sections = content.split(TRANSCRIPT_SEPARATOR);
    let chat_log = sections.next().unwrap_or_default();

    let mut drafts = parse_chat_log(chat_log, &mut stats);

    // Last message sharing a video wins, matching a plain map overwrite
    let mut video_index: HashMap<String, usize> = HashMap::new();
    for (idx, draft) in drafts.iter().enumerate() {
        if let Some(id) = draft.message.video_url().and_then(extract_video_id) {
            video_index.insert(id, idx);
        }
    }
    stats.videos = video_index.len();

    let mut transcripts = Vec::new();
    for block in sections {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }

        let target = find_video_url(block)
            .and_then(|url| extract_video_id(&url))
            .and_then(|id| video_index.get(&id).copied());

        match target {
            Some(idx) => {
                transcripts.push(Draft {
                    at: drafts[idx].at + Duration::seconds(1),
                    message: Message::transcript(
                        TRANSCRIPT_SENDER,
                        TRANSCRIPT_TIME_LABEL,
                        clean_transcript(block),
                    ),
                });
                stats.transcripts_attached += 1;
            }
            None => {
                debug!("Transcript block has no matching video message, dropping it");
                stats.transcripts_orphaned += 1;
            }
        }
    }
    drafts.extend(transcripts);

    // Stable sort keeps export order for identical timestamps
    drafts.sort_by_key(|draft| draft.at);

    let timeline = group_by_day(drafts);
    stats.days = timeline.len();
    stats.messages = timeline.iter().map(|day| day.messages.len()).sum();
    stats.images = timeline
        .iter()
        .flat_map(|day| &day.messages)
        .filter(|msg| msg.message_type == MessageType::Image)
        .count();

    ChatImport { timeline, stats }
}

fn parse_chat_log(chat_log: &str, stats: &mut ImportStats) -> Vec<Draft> {
    let mut drafts: Vec<Draft> = Vec::new();

    for (line_num, raw_line) in chat_log.lines().enumerate() {
        let line = raw_line.replace(['\u{200e}', '\u{200f}'], "");
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(caps) = LINE_RE.captures(line) else {
            // Continuation of the previous message
            if let Some(last) = drafts.last_mut()
                && last.message.message_type != MessageType::Image
            {
                last.message.content.push('\n');
                last.message.content.push_str(line);
                if last.message.video_url.is_none() {
                    last.message.video_url = find_video_url(&last.message.content);
                }
            }
            continue;
        };

        let time = normalize_spaces(&caps[2]);
        let Some(at) = parse_timestamp(&caps[1], &time) else {
            warn!(line = line_num + 1, "Unparseable timestamp in chat export, skipping line");
            stats.unparseable += 1;
            continue;
        };
        let sender = caps[3].trim().to_string();
        let mut text = caps[4].trim().to_string();

        let mut message_type = MessageType::Text;
        let mut file_path = None;
        let mut video_url = None;

        if let Some(attachment) = ATTACHMENT_RE.captures(&text) {
            let tag = attachment[0].to_string();
            let filename = attachment[1].trim().to_string();
            let ext = Path::new(&filename)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();

            if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                message_type = MessageType::Image;
                file_path = Some(format!("{}{}", STATIC_PREFIX, filename));
            } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
                file_path = Some(format!("{}{}", STATIC_PREFIX, filename));
                stats.video_files += 1;
            }
            text = text.replace(&tag, "").trim().to_string();
        } else {
            if is_system_message(&text) {
                stats.system_skipped += 1;
                continue;
            }
            video_url = find_video_url(&text);
        }

        let content = match (message_type, file_path) {
            (MessageType::Image, Some(path)) => path,
            (_, Some(path)) if text.is_empty() => path,
            _ => text,
        };

        drafts.push(Draft {
            at,
            message: Message { sender, time, message_type, content, video_url },
        });
    }

    drafts
}

fn group_by_day(drafts: Vec<Draft>) -> Timeline {
    let mut timeline: Timeline = Vec::new();
    for draft in drafts {
        let key = draft.at.format(DATE_KEY_FORMAT).to_string();
        match timeline.last_mut() {
            Some(day) if day.date == key => day.messages.push(draft.message),
            _ => timeline.push(TimelineDay::new(key, vec![draft.message])),
        }
    }
    timeline
}

fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let combined = format!("{} {}", date, time);
    DATETIME_FORMATS.iter().find_map(|fmt| NaiveDateTime::parse_from_str(&combined, fmt).ok())
}

fn normalize_spaces(text: &str) -> String {
    text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }).collect()
}

fn is_system_message(text: &str) -> bool {
    text.contains("joined using this group's invite link")
        || text.contains("security code changed")
        || MEMBER_ADDED_RE.is_match(text)
}

/// Tidy a raw transcript block for display
///
/// The `URL:` line becomes a source link, the `[Video Transcript]` header
/// becomes a heading, separator lines are dropped and every other line is
/// capitalized and kept as its own paragraph.
pub fn clean_transcript(block: &str) -> String {
    let mut out = String::with_capacity(block.len());

    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("===") {
            continue;
        }
        if let Some(url) = line.strip_prefix("URL:") {
            let url = url.trim();
            out.push_str(&format!("**Source URL:** [{}]({})\n", url, url));
            continue;
        }
        if line.starts_with(TRANSCRIPT_MARKER) {
            out.push_str(&format!("### {}\n", line));
            continue;
        }

        let mut chars = line.chars();
        if let Some(first) = chars.next() {
            if first.is_lowercase() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            } else {
                out.push_str(line);
            }
        }
        out.push_str("\n\n");
    }

    out
}
