/// Filter parameters for a timeline view
///
/// - `search`: case-insensitive literal substring matched against sender and content
/// - `date`: exact date label of the single day to keep
///
/// Both compose with AND. An empty search and no date select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineQuery {
    pub search: String,
    pub date: Option<String>,
}

impl TimelineQuery {
    pub fn new(search: impl Into<String>, date: Option<String>) -> Self {
        Self { search: search.into(), date }
    }

    pub fn search(search: impl Into<String>) -> Self {
        Self { search: search.into(), date: None }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.date.is_none()
    }
}
