/// Filtering and highlighting over parsed timeline documents
mod common;

use chat_archive_explorer::credentials::CredentialStore;
use chat_archive_explorer::filters::{Segment, highlight, message_matches};
use chat_archive_explorer::parsers::parse_timeline_str;
use chat_archive_explorer::state::{ArchiveState, ViewStatus};
use chat_archive_explorer::{Message, TimelineDay, filter};
use common::sample_timeline;

fn amy_timeline() -> Vec<TimelineDay> {
    parse_timeline_str(
        r#"[{"date":"2025-10-01","messages":[
            {"sender":"Amy","type":"text","content":"Hello world","time":"9:00"}]}]"#,
    )
    .unwrap()
}

#[test]
fn test_search_keeps_matching_day_and_highlights_original_case() {
    let timeline = amy_timeline();
    let filtered = filter(&timeline, "hello", None);

    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].messages.len(), 1);
    assert_eq!(
        highlight(&filtered[0].messages[0].content, "hello"),
        vec![Segment::Match("Hello"), Segment::Plain(" world")]
    );
}

#[test]
fn test_search_without_matches_is_empty() {
    assert!(filter(&amy_timeline(), "zzz", None).is_empty());
}

#[test]
fn test_empty_search_returns_whole_timeline() {
    let timeline = parse_timeline_str(&sample_timeline().to_json()).unwrap();
    assert_eq!(filter(&timeline, "", None), timeline);
}

#[test]
fn test_search_then_date_filter() {
    let timeline = parse_timeline_str(&sample_timeline().to_json()).unwrap();

    let all = filter(&timeline, "morning", None);
    assert_eq!(all.len(), 2);

    let one_day = filter(&timeline, "morning", Some("09/29/2025"));
    assert_eq!(one_day.len(), 1);
    assert_eq!(one_day[0].date, "09/29/2025");
    assert_eq!(one_day[0].messages.len(), 1);
}

#[test]
fn test_filter_preserves_order_and_source() {
    let timeline = parse_timeline_str(&sample_timeline().to_json()).unwrap();
    let before = timeline.clone();

    let filtered = filter(&timeline, "bob", None);
    let times: Vec<&str> = filtered[0].messages.iter().map(|m| m.time.as_str()).collect();
    assert_eq!(times, vec!["6:00:00 PM", "6:01:02 PM"]);
    assert_eq!(timeline, before);
}

#[test]
fn test_regex_metacharacters_are_literal() {
    let timeline = vec![TimelineDay::new(
        "10/01/2025",
        vec![
            Message::text("Amy", "9:00", "costs (approx) $5.00?"),
            Message::text("Ben", "9:01", "approx 5 dollars"),
        ],
    )];

    for term in ["(", "(approx", "$5.00?", "[", "*", "\\", "a|b", "^c", ".*"] {
        let _ = filter(&timeline, term, None);
        let _ = highlight(&timeline[0].messages[0].content, term);
    }

    let hits = filter(&timeline, "(approx)", None);
    assert_eq!(hits[0].messages.len(), 1);
    assert_eq!(hits[0].messages[0].sender, "Amy");

    assert!(filter(&timeline, ".*", None).is_empty());
    assert!(message_matches(&timeline[0].messages[0], "$5.00?"));
}

#[test]
fn test_unicode_case_folding() {
    let message = Message::text("Zoë", "9:00", "Straße und ÄPFEL");
    assert!(message_matches(&message, "zoË"));
    assert!(message_matches(&message, "äpfel"));

    let segments = highlight(&message.content, "äpfel");
    assert_eq!(segments.last(), Some(&Segment::Match("ÄPFEL")));
}

#[test]
fn test_state_distinguishes_no_matches_on_selected_date() {
    let timeline = parse_timeline_str(&sample_timeline().to_json()).unwrap();
    let mut state = ArchiveState::new(timeline, CredentialStore::in_memory());

    state.set_search("routine");
    assert_eq!(state.view_status(), ViewStatus::Showing { days: 1, messages: 1 });

    state.set_selected_date(Some("09/28/2025".to_string()));
    assert_eq!(state.view_status(), ViewStatus::NoMatches { date_selected: true });

    state.set_selected_date(None);
    state.set_search("zebra");
    assert_eq!(state.view_status(), ViewStatus::NoMatches { date_selected: false });
}

#[test]
fn test_state_empty_archive() {
    let state = ArchiveState::new(Vec::new(), CredentialStore::in_memory());
    assert_eq!(state.view_status(), ViewStatus::EmptyArchive);
}
