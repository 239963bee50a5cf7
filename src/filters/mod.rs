pub mod apply;
pub mod highlight;
pub mod matching;
pub mod query;

pub use apply::{filter, filter_timeline, message_matches};
pub use highlight::{Segment, highlight, mark_matches, snippet};
pub use matching::{fold_case, match_ranges};
pub use query::TimelineQuery;
