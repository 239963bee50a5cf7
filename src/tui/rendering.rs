use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use super::app::{InputMode, MessageRef, StatusKind, StatusMessage};
use super::layout::{AppLayout, centered_rect};
use crate::classify::{COLLAPSE_THRESHOLD_CHARS, Classification, MessageKind, classify};
use crate::config::AppConfig;
use crate::filters::{Segment, highlight, snippet};
use crate::models::{Message, TimelineDay};
use crate::state::ViewStatus;
use crate::utils::sanitize_for_terminal;

const MUTED: Color = Color::Rgb(113, 113, 122);
const BRIGHT: Color = Color::Rgb(250, 250, 250);
const ACCENT: Color = Color::Rgb(16, 185, 129);
const SURFACE: Color = Color::Rgb(24, 24, 27);
const DANGER: Color = Color::Rgb(239, 68, 68);
const MATCH_BG: Color = Color::Rgb(250, 204, 21);

/// Characters of message text shown in a list row
const ROW_PREVIEW_CHARS: usize = 60;

/// Everything the UI needs for one frame
pub struct RenderState<'a> {
    pub days: &'a [TimelineDay],
    pub rows: &'a [MessageRef],
    pub selected_idx: usize,
    pub search: &'a str,
    pub selected_date: Option<&'a str>,
    pub date_count: usize,
    pub view_status: ViewStatus,
    /// Whether the selected message is expanded
    pub expanded: bool,
    /// Summary of the selected message, if one was generated
    pub summary: Option<&'a str>,
    pub summary_pending: bool,
    pub input_mode: InputMode,
    pub key_input_len: usize,
    pub has_api_key: bool,
    pub alert: Option<&'a str>,
    pub status_message: Option<&'a StatusMessage>,
    pub config: &'a AppConfig,
}

impl RenderState<'_> {
    fn message(&self, r: MessageRef) -> Option<(&TimelineDay, &Message)> {
        let day = self.days.get(r.day)?;
        Some((day, day.messages.get(r.message)?))
    }

    fn selected(&self) -> Option<(&TimelineDay, &Message)> {
        self.rows.get(self.selected_idx).and_then(|&r| self.message(r))
    }
}

/// Render the entire UI
pub fn render_ui(frame: &mut Frame, state: &RenderState) {
    let layout = AppLayout::new(frame.area());

    render_search_bar(frame, layout.search_area, state);
    render_results_list(frame, layout.results_area, state);
    render_preview(frame, layout.preview_area, state);
    render_status_bar(frame, layout.status_area, state);

    if state.input_mode == InputMode::ApiKey {
        render_key_prompt(frame, state);
    }
    if let Some(alert) = state.alert {
        render_alert(frame, alert);
    }
}

fn render_search_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let date = state.selected_date.unwrap_or("all dates");
    let line = Line::from(vec![
        Span::styled("🔍 ", Style::default().fg(MUTED)),
        Span::styled(state.search.to_string(), Style::default().fg(BRIGHT)),
        Span::styled("▏", Style::default().fg(ACCENT)),
    ]);

    let title = format!(" Search | {} ({} days) ", date, state.date_count);
    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(MUTED))
            .title(title),
    );
    frame.render_widget(paragraph, area);
}

fn kind_icon(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::PlainText => "💬",
        MessageKind::Image => "🖼",
        MessageKind::Transcript => "🎬",
        MessageKind::LongText => "📄",
    }
}

/// Split `text` into spans, marking occurrences of `term`
fn highlighted_spans(text: &str, term: &str, base: Style) -> Vec<Span<'static>> {
    highlight(text, term)
        .into_iter()
        .map(|segment| match segment {
            Segment::Plain(s) => Span::styled(s.to_string(), base),
            Segment::Match(s) => Span::styled(
                s.to_string(),
                Style::default().fg(Color::Black).bg(MATCH_BG).add_modifier(Modifier::BOLD),
            ),
        })
        .collect()
}

/// Display name for a message; transcripts are labelled as such
fn sender_label(message: &Message, classification: &Classification) -> String {
    if classification.is_transcript {
        "Video Transcript".to_string()
    } else if message.sender.is_empty() {
        "Unknown".to_string()
    } else {
        sanitize_for_terminal(&message.sender)
    }
}

fn render_results_list(frame: &mut Frame, area: Rect, state: &RenderState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED))
        .title(" Messages ");

    let empty_text = match state.view_status {
        ViewStatus::EmptyArchive => Some("No messages in the archive"),
        ViewStatus::NoMatches { date_selected: true } => Some("No messages match on this date"),
        ViewStatus::NoMatches { date_selected: false } => Some("No messages match your search"),
        ViewStatus::Showing { .. } => None,
    };
    if let Some(text) = empty_text {
        let paragraph =
            Paragraph::new(Span::styled(text, Style::default().fg(MUTED))).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let mut items = Vec::new();
    let mut selected_row = None;
    let mut current_day = None;

    for (idx, &r) in state.rows.iter().enumerate() {
        let Some((day, message)) = state.message(r) else {
            continue;
        };

        if current_day != Some(r.day) {
            current_day = Some(r.day);
            let header = format!("── {} ({}) ──", day.date, day.messages.len());
            items.push(ListItem::new(header).style(Style::default().fg(ACCENT)));
        }

        let classification = classify(message);
        let is_selected = idx == state.selected_idx;
        let base = if is_selected {
            Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(MUTED)
        };

        let preview_text =
            snippet(&sanitize_for_terminal(&message.content), state.search, ROW_PREVIEW_CHARS);

        let mut spans = vec![Span::styled(
            format!(
                "{} {} {}: ",
                kind_icon(classification.kind),
                message.time,
                sender_label(message, &classification)
            ),
            base,
        )];
        spans.extend(highlighted_spans(&preview_text, state.search, base));

        if is_selected {
            selected_row = Some(items.len());
        }
        items.push(ListItem::new(Line::from(spans)).style(base));
    }

    let list = List::new(items).block(block);
    let mut list_state = ListState::default().with_selected(selected_row);
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn label(text: &str) -> Span<'static> {
    Span::styled(text.to_string(), Style::default().fg(MUTED))
}

fn render_preview(frame: &mut Frame, area: Rect, state: &RenderState) {
    let content = if let Some((day, message)) = state.selected() {
        preview_text(state, day, message)
    } else {
        Text::from("No message selected")
    };

    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(MUTED))
                .title(" Preview "),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn preview_text(state: &RenderState, day: &TimelineDay, message: &Message) -> Text<'static> {
    let classification = classify(message);
    let mut lines = vec![
        Line::from(vec![label("From: "), Span::raw(sender_label(message, &classification))]),
        Line::from(vec![label("When: "), Span::raw(format!("{} {}", day.date, message.time))]),
        Line::from(vec![label("Kind: "), Span::raw(classification.kind.label())]),
    ];

    if let Some(url) = message.video_url() {
        lines.push(Line::from(vec![label("Video: "), Span::raw(sanitize_for_terminal(url))]));
    }
    if let Some(thumbnail) = &classification.thumbnail {
        lines.push(Line::from(label("Thumbnail (primary, fallback):")));
        lines.push(Line::from(Span::raw(thumbnail.primary.clone())));
        lines.push(Line::from(Span::raw(thumbnail.fallback.clone())));
    }
    if classification.is_image {
        let url = state.config.resolve_asset_url(&message.content);
        lines.push(Line::from(vec![label("Image: "), Span::raw(sanitize_for_terminal(&url))]));
    }

    if let Some(summary) = state.summary {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Summary",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )));
        for line in sanitize_for_terminal(summary).lines() {
            lines.push(Line::from(Span::styled(line.to_string(), Style::default().fg(BRIGHT))));
        }
    } else if state.summary_pending {
        lines.push(Line::from(""));
        lines.push(Line::from(label("Generating summary…")));
    }

    lines.push(Line::from(""));

    let body = sanitize_for_terminal(&message.content);
    let collapsed = classification.is_collapsible && !state.expanded;
    let shown: String = if collapsed {
        body.chars().take(COLLAPSE_THRESHOLD_CHARS).collect()
    } else {
        body
    };
    for line in shown.lines() {
        lines.push(Line::from(highlighted_spans(line, state.search, Style::default())));
    }

    let mut hints = Vec::new();
    if classification.is_collapsible {
        hints.push(if collapsed { "Enter: show more" } else { "Enter: show less" });
    }
    if classification.offers_summary && state.summary.is_none() {
        hints.push("Ctrl+S: summarize");
    }
    if !hints.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(label(&format!("[{}]", hints.join(" | ")))));
    }

    Text::from(lines)
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let base = Style::default().fg(BRIGHT).bg(SURFACE);

    let (status_text, style) = if let Some(message) = state.status_message {
        let style = match message.kind {
            StatusKind::Error => Style::default().fg(DANGER).bg(SURFACE),
            StatusKind::Success => Style::default().fg(ACCENT).bg(SURFACE),
            StatusKind::Info => base,
        };
        (format!(" {} ", message.text), style)
    } else {
        let mut parts = vec![];

        match state.view_status {
            ViewStatus::Showing { days, messages } => {
                parts.push(format!("{} messages in {} days", messages, days));
                if !state.rows.is_empty() {
                    parts.push(format!("message {}/{}", state.selected_idx + 1, state.rows.len()));
                }
            }
            ViewStatus::NoMatches { .. } => parts.push("No matches".to_string()),
            ViewStatus::EmptyArchive => parts.push("Empty archive".to_string()),
        }

        if !state.has_api_key {
            parts.push("no API key".to_string());
        }
        if !state.search.is_empty() {
            parts.push("Esc: clear".to_string());
        }
        parts.push("Tab: date".to_string());
        parts.push("Ctrl+K: key".to_string());
        parts.push("Ctrl+C: quit".to_string());

        (format!(" {} ", parts.join(" | ")), base)
    };

    frame.render_widget(Paragraph::new(status_text).style(style), area);
}

fn render_key_prompt(frame: &mut Frame, state: &RenderState) {
    let area = centered_rect(frame.area(), 60, 7);
    let masked = "•".repeat(state.key_input_len);
    let lines = vec![
        Line::from("Paste your API key to enable summaries."),
        Line::from(""),
        Line::from(vec![
            label("Key: "),
            Span::raw(masked),
            Span::styled("▏", Style::default().fg(ACCENT)),
        ]),
        Line::from(""),
        Line::from(label("Enter: save (empty removes the key) | Esc: cancel")),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .title(" API key "),
        ),
        area,
    );
}

fn render_alert(frame: &mut Frame, message: &str) {
    let area = centered_rect(frame.area(), 60, 7);
    let lines = vec![
        Line::from(Span::styled(
            sanitize_for_terminal(message),
            Style::default().fg(BRIGHT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(label("Press any key to continue")),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(DANGER))
                .title(" Summary failed "),
        ),
        area,
    );
}
