use super::matching::match_ranges;

/// A piece of text, either outside or inside a search match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Match(&'a str),
}

impl<'a> Segment<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Segment::Plain(s) | Segment::Match(s) => s,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Segment::Match(_))
    }
}

/// Split `text` into plain and matched segments for `term` (case-insensitive).
///
/// Matched segments borrow from `text`, so they keep its original casing.
/// Concatenating the segments always reproduces `text`.
///
/// ```
/// use chat_archive_explorer::filters::{Segment, highlight};
///
/// let segments = highlight("Hello world", "hello");
/// assert_eq!(segments, vec![Segment::Match("Hello"), Segment::Plain(" world")]);
/// ```
pub fn highlight<'a>(text: &'a str, term: &str) -> Vec<Segment<'a>> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut cursor = 0;
    for range in match_ranges(text, term) {
        if range.start > cursor {
            segments.push(Segment::Plain(&text[cursor..range.start]));
        }
        segments.push(Segment::Match(&text[range.clone()]));
        cursor = range.end;
    }
    if cursor < text.len() {
        segments.push(Segment::Plain(&text[cursor..]));
    }

    segments
}

/// Wrap every match of `term` in `open`/`close` markers
pub fn mark_matches(text: &str, term: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in highlight(text, term) {
        match segment {
            Segment::Plain(s) => out.push_str(s),
            Segment::Match(s) => {
                out.push_str(open);
                out.push_str(s);
                out.push_str(close);
            }
        }
    }
    out
}

/// Single-line excerpt of `text` of at most `max_chars` characters (plus
/// ellipses), positioned so the first match of `term` is visible
///
/// Whitespace runs, including newlines, collapse to one space.
pub fn snippet(text: &str, term: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let total = flat.chars().count();
    if total <= max_chars {
        return flat;
    }

    let match_start = match_ranges(&flat, term)
        .first()
        .map(|range| flat[..range.start].chars().count())
        .unwrap_or(0);
    // Keep a little context before the match
    let begin = match_start.saturating_sub(max_chars / 4).min(total - max_chars);

    let body: String = flat.chars().skip(begin).take(max_chars).collect();
    let prefix = if begin > 0 { "…" } else { "" };
    let suffix = if begin + max_chars < total { "…" } else { "" };
    format!("{}{}{}", prefix, body, suffix)
}
