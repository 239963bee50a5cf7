//! Case-insensitive literal substring matching.
//!
//! Search terms are never compiled into patterns, so characters such as `(`,
//! `[` or `*` match themselves. Folding is done char by char and every folded
//! byte remembers the original char it came from, which keeps match ranges on
//! char boundaries of the original text even when lower-casing changes length.

use std::ops::Range;

/// Lower-case `text` char by char
pub fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// True if `haystack` contains the already folded `folded_needle`
pub fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    folded_needle.is_empty() || fold_case(haystack).contains(folded_needle)
}

/// Byte ranges in `text` where `term` occurs, ignoring case.
///
/// Ranges are non-overlapping, ascending, and always fall on char boundaries of
/// `text`. An empty term yields no ranges.
pub fn match_ranges(text: &str, term: &str) -> Vec<Range<usize>> {
    let needle = fold_case(term);
    if needle.is_empty() || text.is_empty() {
        return Vec::new();
    }

    let mut folded = String::with_capacity(text.len());
    // Original char span for every byte of `folded`
    let mut spans: Vec<(usize, usize)> = Vec::with_capacity(text.len());
    for (start, ch) in text.char_indices() {
        let end = start + ch.len_utf8();
        for lower in ch.to_lowercase() {
            folded.push(lower);
            spans.extend(std::iter::repeat_n((start, end), lower.len_utf8()));
        }
    }

    let mut ranges = Vec::new();
    let mut last_end = 0;
    for (idx, matched) in folded.match_indices(needle.as_str()) {
        let start = spans[idx].0;
        let end = spans[idx + matched.len() - 1].1;
        if start < last_end {
            continue;
        }
        ranges.push(start..end);
        last_end = end;
    }

    ranges
}
