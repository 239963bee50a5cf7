use super::matching::{contains_folded, fold_case};
use super::query::TimelineQuery;
use crate::models::{Message, Timeline, TimelineDay};

/// Produce the filtered view of a timeline
///
/// 1. Non-empty search: keep messages whose sender or content contains the
///    term (case-insensitive literal); drop days left without messages.
/// 2. Selected date: keep only the day whose label equals it exactly.
///
/// The source is never modified; day and message order are preserved.
pub fn filter_timeline(timeline: &[TimelineDay], query: &TimelineQuery) -> Timeline {
    let needle = fold_case(&query.search);

    timeline
        .iter()
        .filter(|day| query.date.as_deref().is_none_or(|date| day.date == date))
        .filter_map(|day| {
            if needle.is_empty() {
                return Some(day.clone());
            }
            let messages: Vec<Message> = day
                .messages
                .iter()
                .filter(|message| message_matches_folded(message, &needle))
                .cloned()
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(TimelineDay { date: day.date.clone(), messages })
            }
        })
        .collect()
}

/// `filter(timeline, search, selected_date)` convenience form
pub fn filter(timeline: &[TimelineDay], search: &str, selected_date: Option<&str>) -> Timeline {
    filter_timeline(timeline, &TimelineQuery::new(search, selected_date.map(str::to_string)))
}

/// True if the message's sender or content contains `search` (case-insensitive)
pub fn message_matches(message: &Message, search: &str) -> bool {
    message_matches_folded(message, &fold_case(search))
}

fn message_matches_folded(message: &Message, needle: &str) -> bool {
    contains_folded(&message.sender, needle) || contains_folded(&message.content, needle)
}
