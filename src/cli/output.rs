//! Plain-text rendering for CLI commands.
//!
//! Functions return strings so the exact output is unit-testable; the callers
//! only print.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::classify::{Classification, MessageKind, classify, extract_url};
use crate::config::AppConfig;
use crate::filters::{mark_matches, message_matches, snippet};
use crate::models::{Message, TimelineDay};
use crate::parsers::ImportStats;
use crate::utils::sanitize_for_terminal;

const SNIPPET_CHARS: usize = 100;
const ANSI_MATCH_OPEN: &str = "\x1b[1;30;43m";
const ANSI_RESET: &str = "\x1b[0m";

/// Search results grouped by day, one line per message
///
/// Messages are numbered by their position in the full day so the numbers can
/// be passed to `show` and `summarize`.
pub fn format_search_results(
    timeline: &[TimelineDay],
    term: &str,
    date: Option<&str>,
    color: bool,
) -> (String, usize) {
    let mut out = String::new();
    let mut count = 0;

    for day in timeline.iter().filter(|day| date.is_none_or(|d| day.date == d)) {
        let hits: Vec<(usize, &Message)> = day
            .messages
            .iter()
            .enumerate()
            .filter(|(_, message)| message_matches(message, term))
            .collect();
        if hits.is_empty() {
            continue;
        }

        let _ = writeln!(out, "{}", day.date);
        for (idx, message) in hits {
            count += 1;
            let classification = classify(message);
            let excerpt = snippet(&sanitize_for_terminal(&message.content), term, SNIPPET_CHARS);
            let sender = sanitize_for_terminal(&message.sender);
            let (sender, excerpt) = if color {
                (
                    mark_matches(&sender, term, ANSI_MATCH_OPEN, ANSI_RESET),
                    mark_matches(&excerpt, term, ANSI_MATCH_OPEN, ANSI_RESET),
                )
            } else {
                (sender, excerpt)
            };
            let _ = writeln!(
                out,
                "  #{:<3} {:>8}  {}{}: {}",
                idx + 1,
                message.time,
                kind_tag(&classification),
                sender,
                excerpt
            );
        }
    }

    (out, count)
}

fn kind_tag(classification: &Classification) -> &'static str {
    match classification.kind {
        MessageKind::PlainText => "",
        MessageKind::Image => "[image] ",
        MessageKind::Transcript => "[transcript] ",
        MessageKind::LongText => "[long] ",
    }
}

/// Full detail view of one message
pub fn format_message_detail(
    day: &TimelineDay,
    index: usize,
    message: &Message,
    config: &AppConfig,
    thumbnail: Option<&str>,
) -> String {
    let classification = classify(message);
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    let mut out = String::new();

    let _ = writeln!(out, "Date:        {} (#{})", day.date, index + 1);
    let _ = writeln!(out, "Time:        {}", message.time);
    let _ = writeln!(out, "Sender:      {}", sanitize_for_terminal(&message.sender));
    let _ = writeln!(out, "Kind:        {}", classification.kind.label());
    let _ = writeln!(out, "Collapsible: {}", yes_no(classification.is_collapsible));
    let _ = writeln!(out, "Summary:     {}", yes_no(classification.offers_summary));

    if let Some(url) = message.video_url() {
        let _ = writeln!(out, "Video:       {}", sanitize_for_terminal(url));
    }
    if let Some(id) = &classification.video_id {
        let _ = writeln!(out, "Video ID:    {}", id);
    }
    if let Some(thumb) = &classification.thumbnail {
        match thumbnail {
            Some(url) => {
                let _ = writeln!(out, "Thumbnail:   {}", url);
            }
            None => {
                let _ = writeln!(out, "Thumbnail:   {}", thumb.primary);
                let _ = writeln!(out, "  fallback:  {}", thumb.fallback);
            }
        }
    }
    if classification.is_image {
        let _ = writeln!(out, "Image:       {}", config.resolve_asset_url(&message.content));
    } else if let Some(link) = extract_url(&message.content) {
        let _ = writeln!(out, "Link:        {}", sanitize_for_terminal(&link));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", sanitize_for_terminal(&message.content));
    out
}

/// Archive overview: counts by kind, busiest senders, date range
pub fn format_stats(timeline: &[TimelineDay], source: &str) -> String {
    let mut by_kind: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut senders: BTreeMap<&str, usize> = BTreeMap::new();
    let mut with_video = 0;
    let mut summarizable = 0;

    for message in timeline.iter().flat_map(|day| &day.messages) {
        let classification = classify(message);
        *by_kind.entry(classification.kind.label()).or_default() += 1;
        *senders.entry(message.sender.as_str()).or_default() += 1;
        if classification.video_id.is_some() {
            with_video += 1;
        }
        if classification.offers_summary {
            summarizable += 1;
        }
    }

    let total: usize = by_kind.values().sum();
    let mut out = String::new();
    let _ = writeln!(out, "Chat Archive Statistics");
    let _ = writeln!(out, "=======================");
    let _ = writeln!(out, "Days: {}", timeline.len());
    let _ = writeln!(out, "Messages: {}", total);
    for (kind, count) in &by_kind {
        let _ = writeln!(out, "  {}: {}", kind, count);
    }
    let _ = writeln!(out, "With video: {}", with_video);
    let _ = writeln!(out, "Summarizable: {}", summarizable);

    let mut top: Vec<(&str, usize)> = senders.into_iter().collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    if !top.is_empty() {
        let _ = writeln!(out, "Top senders:");
        for (sender, count) in top.into_iter().take(5) {
            let _ = writeln!(out, "  {}: {}", sanitize_for_terminal(sender), count);
        }
    }

    let _ = writeln!(out);
    if let (Some(first), Some(last)) = (timeline.first(), timeline.last()) {
        let _ = writeln!(out, "First day: {}", first.date);
        let _ = writeln!(out, "Last day: {}", last.date);
    }
    let _ = writeln!(out, "Source: {}", source);
    out
}

pub fn format_import_stats(stats: &ImportStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Days: {}", stats.days);
    let _ = writeln!(out, "Messages: {}", stats.messages);
    let _ = writeln!(out, "  Images: {}", stats.images);
    let _ = writeln!(out, "  Video files: {}", stats.video_files);
    let _ = writeln!(out, "  Shared videos: {}", stats.videos);
    let _ = writeln!(
        out,
        "Transcripts: {} attached, {} without a matching video",
        stats.transcripts_attached, stats.transcripts_orphaned
    );
    let _ = writeln!(
        out,
        "Skipped: {} system lines, {} unparseable lines",
        stats.system_skipped, stats.unparseable
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> Vec<TimelineDay> {
        vec![
            TimelineDay::new(
                "10/01/2025",
                vec![
                    Message::text("Amy", "9:00", "Hello world"),
                    Message::text("Ben", "9:05", "Morning"),
                    Message::image("Ben", "9:06", "/static/a.jpg"),
                ],
            ),
            TimelineDay::new(
                "10/02/2025",
                vec![
                    Message::transcript("Bot", "Transcript", "[Video Transcript]\nhello sleep")
                        .with_video_url("https://youtu.be/abc123"),
                ],
            ),
        ]
    }

    #[test]
    fn test_search_results_keep_day_positions() {
        let (out, count) = format_search_results(&timeline(), "morning", None, false);
        assert_eq!(count, 1);
        assert_eq!(out, "10/01/2025\n  #2       9:05  Ben: Morning\n");
    }

    #[test]
    fn test_search_results_date_filter_and_tags() {
        let (out, count) = format_search_results(&timeline(), "hello", Some("10/02/2025"), false);
        assert_eq!(count, 1);
        assert!(out.contains("[transcript] Bot:"));
        assert!(!out.contains("10/01/2025"));
    }

    #[test]
    fn test_search_results_color_marks_matches() {
        let (out, _) = format_search_results(&timeline(), "WORLD", None, true);
        assert!(out.contains("Hello \x1b[1;30;43mworld\x1b[0m"));
    }

    #[test]
    fn test_search_results_none() {
        let (out, count) = format_search_results(&timeline(), "zzz", None, false);
        assert_eq!(count, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_message_detail_for_transcript() {
        let days = timeline();
        let out = format_message_detail(
            &days[1],
            0,
            &days[1].messages[0],
            &AppConfig::default(),
            None,
        );
        assert!(out.contains("Kind:        transcript"));
        assert!(out.contains("Collapsible: yes"));
        assert!(out.contains("Video ID:    abc123"));
        assert!(out.contains("https://img.youtube.com/vi/abc123/hqdefault.jpg"));
        assert!(out.contains("https://img.youtube.com/vi/abc123/mqdefault.jpg"));
    }

    #[test]
    fn test_message_detail_with_probed_thumbnail() {
        let days = timeline();
        let fallback = "https://img.youtube.com/vi/abc123/mqdefault.jpg";
        let out = format_message_detail(
            &days[1],
            0,
            &days[1].messages[0],
            &AppConfig::default(),
            Some(fallback),
        );
        assert!(out.contains(&format!("Thumbnail:   {}", fallback)));
        assert!(!out.contains("hqdefault"));
    }

    #[test]
    fn test_message_detail_for_image() {
        let days = timeline();
        let config = AppConfig {
            site_base_url: "https://example.org/site/".to_string(),
            ..AppConfig::default()
        };
        let out = format_message_detail(&days[0], 2, &days[0].messages[2], &config, None);
        assert!(out.contains("Date:        10/01/2025 (#3)"));
        assert!(out.contains("Image:       https://example.org/site/static/a.jpg"));
    }

    #[test]
    fn test_stats() {
        let out = format_stats(&timeline(), "timeline.json");
        assert!(out.contains("Days: 2"));
        assert!(out.contains("Messages: 4"));
        assert!(out.contains("  image: 1"));
        assert!(out.contains("  transcript: 1"));
        assert!(out.contains("With video: 1"));
        assert!(out.contains("  Ben: 2"));
        assert!(out.contains("First day: 10/01/2025"));
        assert!(out.contains("Source: timeline.json"));
    }

    #[test]
    fn test_import_stats() {
        let stats =
            ImportStats { days: 2, messages: 5, transcripts_orphaned: 1, ..Default::default() };
        let out = format_import_stats(&stats);
        assert!(out.contains("Days: 2"));
        assert!(out.contains("0 attached, 1 without a matching video"));
    }
}
