//! Application state shared by the TUI and the CLI commands.

use std::sync::Arc;

use anyhow::Result;

use crate::credentials::CredentialStore;
use crate::filters::{TimelineQuery, filter_timeline};
use crate::models::{Timeline, TimelineDay};

/// What the message view should show for the current filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    /// Nothing was loaded at all
    EmptyArchive,
    /// The archive has messages but the active filters exclude all of them
    NoMatches { date_selected: bool },
    Showing { days: usize, messages: usize },
}

/// Ground-truth timeline, active filters, derived view and stored credential
///
/// Every setter recomputes the filtered view, so [`filtered`](Self::filtered)
/// is always consistent with [`search`](Self::search) and
/// [`selected_date`](Self::selected_date).
pub struct ArchiveState {
    timeline: Arc<Timeline>,
    query: TimelineQuery,
    filtered: Timeline,
    credentials: CredentialStore,
}

impl ArchiveState {
    pub fn new(timeline: Timeline, credentials: CredentialStore) -> Self {
        let mut state = Self {
            timeline: Arc::new(timeline),
            query: TimelineQuery::default(),
            filtered: Vec::new(),
            credentials,
        };
        state.recompute();
        state
    }

    pub fn timeline(&self) -> &[TimelineDay] {
        &self.timeline
    }

    /// Replace the timeline; a selected date that no longer exists is cleared
    pub fn set_timeline(&mut self, timeline: Timeline) {
        self.timeline = Arc::new(timeline);
        if let Some(date) = &self.query.date
            && !self.timeline.iter().any(|day| &day.date == date)
        {
            self.query.date = None;
        }
        self.recompute();
    }

    pub fn search(&self) -> &str {
        &self.query.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
        self.recompute();
    }

    pub fn selected_date(&self) -> Option<&str> {
        self.query.date.as_deref()
    }

    pub fn set_selected_date(&mut self, date: Option<String>) {
        self.query.date = date;
        self.recompute();
    }

    /// Select `date`, or clear the selection when it is already selected
    pub fn toggle_date(&mut self, date: &str) {
        if self.query.date.as_deref() == Some(date) {
            self.query.date = None;
        } else {
            self.query.date = Some(date.to_string());
        }
        self.recompute();
    }

    /// Move the date selection by `offset` through all dates, wrapping through
    /// "no date selected"
    pub fn cycle_date(&mut self, offset: isize) {
        let dates = self.dates();
        if dates.is_empty() {
            return;
        }

        // Position 0 is "all dates", positions 1..=len are the dates
        let slots = dates.len() as isize + 1;
        let current = self
            .query
            .date
            .as_deref()
            .and_then(|d| dates.iter().position(|&date| date == d))
            .map_or(0, |idx| idx as isize + 1);
        let next = (current + offset).rem_euclid(slots);

        let date = if next == 0 { None } else { Some(dates[next as usize - 1].to_string()) };
        self.set_selected_date(date);
    }

    pub fn query(&self) -> &TimelineQuery {
        &self.query
    }

    pub fn filtered(&self) -> &[TimelineDay] {
        &self.filtered
    }

    /// Dates of the full timeline in document order, for date navigation
    pub fn dates(&self) -> Vec<&str> {
        self.timeline.iter().map(|day| day.date.as_str()).collect()
    }

    pub fn total_messages(&self) -> usize {
        self.timeline.iter().map(|day| day.messages.len()).sum()
    }

    pub fn view_status(&self) -> ViewStatus {
        if self.total_messages() == 0 {
            return ViewStatus::EmptyArchive;
        }
        let messages: usize = self.filtered.iter().map(|day| day.messages.len()).sum();
        if messages == 0 {
            ViewStatus::NoMatches { date_selected: self.query.date.is_some() }
        } else {
            ViewStatus::Showing { days: self.filtered.len(), messages }
        }
    }

    pub fn api_key(&self) -> Option<String> {
        self.credentials.api_key()
    }

    pub fn has_api_key(&self) -> bool {
        self.credentials.has_api_key()
    }

    pub fn set_api_key(&mut self, key: &str) -> Result<()> {
        self.credentials.set_api_key(key)
    }

    pub fn clear_api_key(&mut self) -> Result<()> {
        self.credentials.clear_api_key()
    }

    fn recompute(&mut self) {
        self.filtered = filter_timeline(&self.timeline, &self.query);
    }
}
