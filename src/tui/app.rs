//! TUI application state and event handling.
//!
//! The `App` owns an [`ArchiveState`] and everything that only matters while
//! browsing:
//!
//! - **Message list**: the filtered timeline flattened into selectable rows
//! - **Search and date filters**: typed characters edit the search term, Tab
//!   cycles the date, Ctrl+D toggles the date of the selected message
//! - **Expansion**: Enter expands or collapses long messages and transcripts
//! - **Summaries**: Ctrl+S requests a summary on a worker thread; only the
//!   latest request is ever shown
//! - **API key prompt**: opened with Ctrl+K, or automatically when a summary
//!   needs a credential
//! - **Status messages and alerts**: transient feedback in the status bar,
//!   blocking alerts for failed summaries
//!
//! # Example
//!
//! ```rust,ignore
//! let mut app = App::new(state, config, summarizer);
//! app.run(&mut terminal)?;
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use ratatui::Terminal;
use ratatui::backend::Backend;
use tracing::{info, warn};

use super::events::{Action, poll_event};
use super::rendering::{RenderState, render_ui};
use crate::classify::classify;
use crate::config::AppConfig;
use crate::loader::TimelineLoader;
use crate::models::Message;
use crate::state::ArchiveState;
use crate::summarize::{Summarizer, SummaryDispatcher, SummaryError};

/// Duration for success status messages (milliseconds)
const STATUS_SUCCESS_DURATION_MS: u64 = 3000;
/// Duration for error status messages (milliseconds)
const STATUS_ERROR_DURATION_MS: u64 = 5000;
/// Search terms and API keys are capped at this many characters
const MAX_INPUT_CHARS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Transient status message with expiry
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub expires_at: Instant,
}

/// Where typed characters go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Search,
    ApiKey,
}

/// Position of a message in the filtered view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub day: usize,
    pub message: usize,
}

/// Identity of a message within the current view: date plus position in that day
type MessageKey = (String, usize);

/// A generated summary and the message it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryPanel {
    key: MessageKey,
    pub text: String,
}

/// Message whose summary is being generated or waits for a credential
struct PendingSummary {
    key: MessageKey,
    text: String,
}

pub struct App {
    state: ArchiveState,
    config: AppConfig,
    dispatcher: SummaryDispatcher,
    rows: Vec<MessageRef>,
    selected_idx: usize,
    should_quit: bool,
    input_mode: InputMode,
    key_input: String,
    expanded: HashSet<MessageKey>,
    summary: Option<SummaryPanel>,
    summary_target: Option<PendingSummary>,
    awaiting_key: Option<PendingSummary>,
    alert: Option<String>,
    status_message: Option<StatusMessage>,
    // Dirty state tracking for efficient rendering
    needs_redraw: bool,
    last_draw_time: Instant,
}

impl App {
    pub fn new(state: ArchiveState, config: AppConfig, summarizer: Arc<dyn Summarizer>) -> Self {
        let mut app = Self {
            state,
            config,
            dispatcher: SummaryDispatcher::new(summarizer),
            rows: Vec::new(),
            selected_idx: 0,
            should_quit: false,
            input_mode: InputMode::Search,
            key_input: String::new(),
            expanded: HashSet::new(),
            summary: None,
            summary_target: None,
            awaiting_key: None,
            alert: None,
            status_message: None,
            needs_redraw: true,
            last_draw_time: Instant::now(),
        };
        app.rebuild_rows();
        app
    }

    /// Show a status message on startup, e.g. which timeline source was used
    pub fn with_status(mut self, text: impl Into<String>, kind: StatusKind) -> Self {
        let duration = match kind {
            StatusKind::Error => STATUS_ERROR_DURATION_MS,
            _ => STATUS_SUCCESS_DURATION_MS,
        };
        self.set_status(text, kind, duration);
        self
    }

    /// Set a transient status message with automatic expiry
    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind, duration_ms: u64) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            kind,
            expires_at: Instant::now() + Duration::from_millis(duration_ms),
        });
        self.needs_redraw = true;
    }

    /// Check and clear expired status messages
    fn check_and_clear_expired_status(&mut self) {
        let should_clear = self
            .status_message
            .as_ref()
            .map(|msg| Instant::now() >= msg.expires_at)
            .unwrap_or(false);
        if should_clear {
            self.status_message = None;
            self.needs_redraw = true;
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            self.check_and_clear_expired_status();
            self.process_summary_updates();

            // Draw if dirty or if it's been >100ms (for terminal resize handling)
            let now = Instant::now();
            let elapsed = now.duration_since(self.last_draw_time);
            if self.needs_redraw || elapsed >= Duration::from_millis(100) {
                terminal.draw(|f| render_ui(f, &self.render_state()))?;
                self.needs_redraw = false;
                self.last_draw_time = now;
            }

            let action = poll_event(Duration::from_millis(100))?;
            self.handle_action(action);
        }

        self.dispatcher.cancel();
        Ok(())
    }

    fn render_state(&self) -> RenderState<'_> {
        let selected = self.selected_key();
        RenderState {
            days: self.state.filtered(),
            rows: &self.rows,
            selected_idx: self.selected_idx,
            search: self.state.search(),
            selected_date: self.state.selected_date(),
            date_count: self.state.dates().len(),
            view_status: self.state.view_status(),
            expanded: selected.as_ref().is_some_and(|key| self.expanded.contains(key)),
            summary: self
                .summary
                .as_ref()
                .filter(|panel| Some(&panel.key) == selected.as_ref())
                .map(|panel| panel.text.as_str()),
            summary_pending: self.dispatcher.is_pending(),
            input_mode: self.input_mode,
            key_input_len: self.key_input.chars().count(),
            has_api_key: self.state.has_api_key(),
            alert: self.alert.as_deref(),
            status_message: self.status_message.as_ref(),
            config: &self.config,
        }
    }

    /// Pick up a finished summary request, if any
    fn process_summary_updates(&mut self) {
        let Some(outcome) = self.dispatcher.poll() else {
            return;
        };
        let target = self.summary_target.take();
        self.needs_redraw = true;

        match outcome.result {
            Ok(text) => {
                if let Some(target) = target {
                    self.summary = Some(SummaryPanel { key: target.key, text });
                }
                self.set_status(
                    "✓ Summary ready",
                    StatusKind::Success,
                    STATUS_SUCCESS_DURATION_MS,
                );
            }
            Err(e) => self.handle_summary_error(e, target),
        }
    }

    fn handle_summary_error(&mut self, error: SummaryError, target: Option<PendingSummary>) {
        warn!("Summary failed: {}", error);
        if error.is_credential_related() {
            if !matches!(error, SummaryError::MissingCredential)
                && let Err(e) = self.state.clear_api_key()
            {
                warn!("Failed to clear rejected API key: {:#}", e);
            }
            self.awaiting_key = target;
            self.open_key_prompt();
        }
        if !matches!(error, SummaryError::MissingCredential) {
            self.alert = Some(error.to_string());
        }
    }

    /// Handle a user action (extracted for testing)
    fn handle_action(&mut self, action: Action) {
        if action == Action::None {
            return;
        }
        if action == Action::Quit {
            self.should_quit = true;
            return;
        }
        // An alert blocks everything until dismissed
        if self.alert.take().is_some() {
            self.needs_redraw = true;
            return;
        }

        match self.input_mode {
            InputMode::ApiKey => self.handle_key_prompt_action(action),
            InputMode::Search => self.handle_browse_action(action),
        }
    }

    fn handle_browse_action(&mut self, action: Action) {
        match action {
            Action::Back => self.back(),
            Action::MoveUp => self.move_selection(-1),
            Action::MoveDown => self.move_selection(1),
            Action::PageUp => self.move_selection(-10),
            Action::PageDown => self.move_selection(10),
            Action::Confirm => self.toggle_expanded(),
            Action::NextDate => self.cycle_date(1),
            Action::PrevDate => self.cycle_date(-1),
            Action::ToggleDayOfSelection => self.toggle_day_of_selection(),
            Action::Summarize => self.summarize_selected(),
            Action::EditApiKey => self.open_key_prompt(),
            Action::Reload => self.reload(),
            Action::UpdateSearch(c) => self.update_search(c),
            Action::DeleteChar => self.delete_char(),
            Action::Quit | Action::None => {}
        }
    }

    fn handle_key_prompt_action(&mut self, action: Action) {
        match action {
            Action::Back => {
                self.close_key_prompt();
                self.awaiting_key = None;
            }
            Action::Confirm => self.save_api_key(),
            Action::UpdateSearch(c) => {
                if self.key_input.chars().count() < MAX_INPUT_CHARS {
                    self.key_input.push(c);
                    self.needs_redraw = true;
                }
            }
            Action::DeleteChar => {
                if self.key_input.pop().is_some() {
                    self.needs_redraw = true;
                }
            }
            _ => {}
        }
    }

    /// Esc peels back one layer: pending summary, summary panel, search term, then quit
    fn back(&mut self) {
        if self.dispatcher.cancel() {
            self.summary_target = None;
            self.set_status("Summary cancelled", StatusKind::Info, STATUS_SUCCESS_DURATION_MS);
        } else if self.summary.take().is_some() {
            self.needs_redraw = true;
        } else if self.state.search().is_empty() {
            self.should_quit = true;
        } else {
            self.state.set_search("");
            self.on_view_changed();
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let total = self.rows.len();
        if total == 0 {
            self.selected_idx = 0;
            return;
        }

        let old_idx = self.selected_idx;
        let new_idx = (self.selected_idx as isize + delta).max(0) as usize;
        self.selected_idx = new_idx.min(total - 1);

        if old_idx != self.selected_idx {
            self.needs_redraw = true;
        }
    }

    fn update_search(&mut self, c: char) {
        let mut search = self.state.search().to_string();
        if search.chars().count() < MAX_INPUT_CHARS {
            search.push(c);
            self.state.set_search(search);
            self.on_view_changed();
        }
    }

    fn delete_char(&mut self) {
        let mut search = self.state.search().to_string();
        if search.pop().is_some() {
            self.state.set_search(search);
            self.on_view_changed();
        }
    }

    fn cycle_date(&mut self, offset: isize) {
        self.state.cycle_date(offset);
        self.on_view_changed();
    }

    fn toggle_day_of_selection(&mut self) {
        let Some(date) = self.selected_key().map(|(date, _)| date) else {
            return;
        };
        self.state.toggle_date(&date);
        self.on_view_changed();
    }

    fn toggle_expanded(&mut self) {
        let Some(message) = self.selected_message() else {
            return;
        };
        if !classify(message).is_collapsible {
            return;
        }
        if let Some(key) = self.selected_key()
            && !self.expanded.remove(&key)
        {
            self.expanded.insert(key);
        }
        self.needs_redraw = true;
    }

    fn summarize_selected(&mut self) {
        let (Some(key), Some(message)) = (self.selected_key(), self.selected_message()) else {
            return;
        };
        if !classify(message).offers_summary {
            self.set_status(
                "✗ Message is too short to summarize",
                StatusKind::Error,
                STATUS_ERROR_DURATION_MS,
            );
            return;
        }
        let text = message.content.clone();
        self.start_summary(key, text);
    }

    fn start_summary(&mut self, key: MessageKey, text: String) {
        match self.dispatcher.start(self.state.api_key(), text.clone()) {
            Ok(request_id) => {
                info!(request_id, "Summary requested");
                self.summary_target = Some(PendingSummary { key, text });
                self.set_status(
                    "Generating summary…",
                    StatusKind::Info,
                    STATUS_ERROR_DURATION_MS,
                );
            }
            Err(SummaryError::MissingCredential) => {
                self.awaiting_key = Some(PendingSummary { key, text });
                self.open_key_prompt();
                self.set_status(
                    "Enter an API key to generate summaries",
                    StatusKind::Info,
                    STATUS_ERROR_DURATION_MS,
                );
            }
            Err(e) => self.handle_summary_error(e, Some(PendingSummary { key, text })),
        }
    }

    fn open_key_prompt(&mut self) {
        self.input_mode = InputMode::ApiKey;
        self.key_input.clear();
        self.needs_redraw = true;
    }

    fn close_key_prompt(&mut self) {
        self.input_mode = InputMode::Search;
        self.key_input.clear();
        self.needs_redraw = true;
    }

    /// Save the typed key (an empty prompt removes the stored key), then resume
    /// any summary that was waiting for it
    fn save_api_key(&mut self) {
        let input = std::mem::take(&mut self.key_input);
        let result = if input.trim().is_empty() {
            self.state.clear_api_key().map(|()| "✓ API key removed")
        } else {
            self.state.set_api_key(&input).map(|()| "✓ API key saved")
        };
        self.close_key_prompt();

        match result {
            Ok(message) => {
                self.set_status(message, StatusKind::Success, STATUS_SUCCESS_DURATION_MS);
                if let Some(pending) = self.awaiting_key.take()
                    && self.state.has_api_key()
                {
                    self.start_summary(pending.key, pending.text);
                }
            }
            Err(e) => {
                self.awaiting_key = None;
                self.set_status(
                    format!("✗ Failed to save API key: {}", e),
                    StatusKind::Error,
                    STATUS_ERROR_DURATION_MS,
                );
            }
        }
    }

    fn reload(&mut self) {
        let loader = TimelineLoader::new(self.config.http_timeout());
        let report = loader.load_with_report(&self.config.timeline_sources());

        // A failed reload keeps the archive already on screen
        let Some(source) = report.source else {
            self.set_status(
                "✗ No timeline source available, keeping the loaded archive",
                StatusKind::Error,
                STATUS_ERROR_DURATION_MS,
            );
            return;
        };

        self.state.set_timeline(report.timeline);
        self.on_view_changed();
        self.set_status(
            format!("✓ Reloaded from {}", source),
            StatusKind::Success,
            STATUS_SUCCESS_DURATION_MS,
        );
    }

    /// Positions in the view moved: rebuild rows and drop per-message UI state
    fn on_view_changed(&mut self) {
        self.expanded.clear();
        self.summary = None;
        if self.dispatcher.cancel() {
            self.summary_target = None;
        }
        self.selected_idx = 0;
        self.rebuild_rows();
        self.needs_redraw = true;
    }

    fn rebuild_rows(&mut self) {
        self.rows = self
            .state
            .filtered()
            .iter()
            .enumerate()
            .flat_map(|(day, d)| {
                (0..d.messages.len()).map(move |message| MessageRef { day, message })
            })
            .collect();
        if self.selected_idx >= self.rows.len() {
            self.selected_idx = self.rows.len().saturating_sub(1);
        }
    }

    fn selected_ref(&self) -> Option<MessageRef> {
        self.rows.get(self.selected_idx).copied()
    }

    fn selected_message(&self) -> Option<&Message> {
        let r = self.selected_ref()?;
        self.state.filtered().get(r.day)?.messages.get(r.message)
    }

    fn selected_key(&self) -> Option<MessageKey> {
        let r = self.selected_ref()?;
        let day = self.state.filtered().get(r.day)?;
        Some((day.date.clone(), r.message))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::credentials::CredentialStore;
    use crate::models::{Timeline, TimelineDay};

    #[derive(Default)]
    struct FakeSummarizer {
        calls: AtomicUsize,
        fail_with: Mutex<Option<SummaryError>>,
    }

    impl Summarizer for FakeSummarizer {
        fn summarize(&self, _api_key: &str, text: &str) -> Result<String, SummaryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_with.lock().unwrap().clone() {
                Some(e) => Err(e),
                None => Ok(format!("{} chars", text.chars().count())),
            }
        }
    }

    fn long_text(chars: usize) -> String {
        "word ".repeat(chars / 5 + 1).chars().take(chars).collect()
    }

    fn sample() -> Timeline {
        vec![
            TimelineDay::new(
                "10/01/2025",
                vec![
                    Message::text("Amy", "9:00", "Hello world"),
                    Message::text("Ben", "9:05", long_text(900)),
                    Message::text("Cat", "9:10", long_text(400)),
                ],
            ),
            TimelineDay::new("10/02/2025", vec![Message::text("Amy", "8:00", "hello again")]),
        ]
    }

    fn create_app() -> (App, Arc<FakeSummarizer>) {
        let summarizer = Arc::new(FakeSummarizer::default());
        let state = ArchiveState::new(sample(), CredentialStore::in_memory());
        let app = App::new(state, AppConfig::default(), summarizer.clone());
        (app, summarizer)
    }

    fn wait_for_summary(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.dispatcher.is_pending() && Instant::now() < deadline {
            app.process_summary_updates();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_app_new_initializes_state() {
        let (app, _) = create_app();
        assert_eq!(app.selected_idx, 0);
        assert_eq!(app.rows.len(), 4);
        assert_eq!(app.input_mode, InputMode::Search);
        assert!(!app.should_quit);
        assert!(app.needs_redraw);
    }

    #[test]
    fn test_move_selection_bounds() {
        let (mut app, _) = create_app();
        app.move_selection(-10);
        assert_eq!(app.selected_idx, 0);
        app.move_selection(10);
        assert_eq!(app.selected_idx, 3);
        app.handle_action(Action::MoveUp);
        assert_eq!(app.selected_idx, 2);
    }

    #[test]
    fn test_typing_filters_view() {
        let (mut app, _) = create_app();
        for c in "hello".chars() {
            app.handle_action(Action::UpdateSearch(c));
        }
        assert_eq!(app.state.search(), "hello");
        assert_eq!(app.rows.len(), 2);

        app.handle_action(Action::UpdateSearch('z'));
        assert!(app.rows.is_empty());

        app.handle_action(Action::DeleteChar);
        assert_eq!(app.rows.len(), 2);
    }

    #[test]
    fn test_search_length_limit() {
        let (mut app, _) = create_app();
        for _ in 0..300 {
            app.update_search('x');
        }
        assert_eq!(app.state.search().chars().count(), MAX_INPUT_CHARS);
    }

    #[test]
    fn test_back_clears_search_then_quits() {
        let (mut app, _) = create_app();
        app.handle_action(Action::UpdateSearch('a'));
        app.handle_action(Action::Back);
        assert_eq!(app.state.search(), "");
        assert!(!app.should_quit);

        app.handle_action(Action::Back);
        assert!(app.should_quit);
    }

    #[test]
    fn test_date_cycling() {
        let (mut app, _) = create_app();
        app.handle_action(Action::NextDate);
        assert_eq!(app.state.selected_date(), Some("10/01/2025"));
        assert_eq!(app.rows.len(), 3);

        app.handle_action(Action::PrevDate);
        assert_eq!(app.state.selected_date(), None);
        assert_eq!(app.rows.len(), 4);
    }

    #[test]
    fn test_toggle_day_of_selection() {
        let (mut app, _) = create_app();
        app.selected_idx = 3;
        app.handle_action(Action::ToggleDayOfSelection);
        assert_eq!(app.state.selected_date(), Some("10/02/2025"));
        assert_eq!(app.rows.len(), 1);

        app.handle_action(Action::ToggleDayOfSelection);
        assert_eq!(app.state.selected_date(), None);
    }

    #[test]
    fn test_expand_only_collapsible() {
        let (mut app, _) = create_app();
        app.handle_action(Action::Confirm);
        assert!(app.expanded.is_empty());

        app.selected_idx = 1;
        app.handle_action(Action::Confirm);
        assert!(app.expanded.contains(&("10/01/2025".to_string(), 1)));
        assert!(app.render_state().expanded);

        app.handle_action(Action::Confirm);
        assert!(app.expanded.is_empty());
    }

    #[test]
    fn test_expansion_reset_on_search() {
        let (mut app, _) = create_app();
        app.selected_idx = 1;
        app.handle_action(Action::Confirm);
        app.handle_action(Action::UpdateSearch('w'));
        assert!(app.expanded.is_empty());
        assert_eq!(app.selected_idx, 0);
    }

    #[test]
    fn test_summarize_short_message_refused() {
        let (mut app, summarizer) = create_app();
        app.handle_action(Action::Summarize);
        assert_eq!(app.status_message.as_ref().map(|m| m.kind), Some(StatusKind::Error));
        assert!(!app.dispatcher.is_pending());
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_summarize_without_key_opens_prompt() {
        let (mut app, summarizer) = create_app();
        app.selected_idx = 2;
        app.handle_action(Action::Summarize);

        assert_eq!(app.input_mode, InputMode::ApiKey);
        assert!(app.awaiting_key.is_some());
        assert!(!app.dispatcher.is_pending());
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_saving_key_resumes_summary() {
        let (mut app, summarizer) = create_app();
        app.selected_idx = 2;
        app.handle_action(Action::Summarize);
        for c in "gsk_test".chars() {
            app.handle_action(Action::UpdateSearch(c));
        }
        // Typing in the prompt leaves the search untouched
        assert_eq!(app.state.search(), "");

        app.handle_action(Action::Confirm);
        assert_eq!(app.input_mode, InputMode::Search);
        assert_eq!(app.state.api_key().as_deref(), Some("gsk_test"));

        wait_for_summary(&mut app);
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.render_state().summary, Some("400 chars"));
    }

    #[test]
    fn test_summary_only_shown_for_its_message() {
        let (mut app, _) = create_app();
        app.state.set_api_key("k").unwrap();
        app.selected_idx = 1;
        app.handle_action(Action::Summarize);
        wait_for_summary(&mut app);
        assert_eq!(app.render_state().summary, Some("900 chars"));

        app.handle_action(Action::MoveDown);
        assert_eq!(app.render_state().summary, None);
        app.handle_action(Action::MoveUp);
        assert_eq!(app.render_state().summary, Some("900 chars"));

        // Esc closes the panel before touching the search
        app.handle_action(Action::Back);
        assert!(app.summary.is_none());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_rejected_key_is_cleared_and_alerted() {
        let (mut app, summarizer) = create_app();
        *summarizer.fail_with.lock().unwrap() =
            Some(SummaryError::Api { status: 401, message: "Invalid API Key".into() });
        app.state.set_api_key("bad").unwrap();
        app.selected_idx = 1;

        app.handle_action(Action::Summarize);
        wait_for_summary(&mut app);

        assert_eq!(app.alert.as_deref(), Some("Invalid API Key"));
        assert_eq!(app.input_mode, InputMode::ApiKey);
        assert!(!app.state.has_api_key());

        // First key press only dismisses the alert
        app.handle_action(Action::UpdateSearch('x'));
        assert!(app.alert.is_none());
        assert_eq!(app.key_input, "");
    }

    #[test]
    fn test_other_failures_alert_without_prompt() {
        let (mut app, summarizer) = create_app();
        *summarizer.fail_with.lock().unwrap() = Some(SummaryError::Network("timed out".into()));
        app.state.set_api_key("k").unwrap();
        app.selected_idx = 1;

        app.handle_action(Action::Summarize);
        wait_for_summary(&mut app);

        assert_eq!(app.alert.as_deref(), Some("Network error: timed out"));
        assert_eq!(app.input_mode, InputMode::Search);
        assert!(app.state.has_api_key());
    }

    #[test]
    fn test_key_prompt_cancel_and_clear() {
        let (mut app, _) = create_app();
        app.state.set_api_key("old").unwrap();

        app.handle_action(Action::EditApiKey);
        app.handle_action(Action::UpdateSearch('n'));
        app.handle_action(Action::Back);
        assert_eq!(app.input_mode, InputMode::Search);
        assert_eq!(app.state.api_key().as_deref(), Some("old"));

        // Submitting an empty prompt removes the stored key
        app.handle_action(Action::EditApiKey);
        app.handle_action(Action::Confirm);
        assert!(!app.state.has_api_key());
    }

    #[test]
    fn test_status_message_expiry() {
        let (mut app, _) = create_app();
        app.set_status("Test", StatusKind::Success, 0);
        std::thread::sleep(Duration::from_millis(5));
        app.needs_redraw = false;
        app.check_and_clear_expired_status();
        assert!(app.status_message.is_none());
        assert!(app.needs_redraw);
    }

    #[test]
    fn test_status_message_kept_until_expiry() {
        let (mut app, _) = create_app();
        app.set_status("Test", StatusKind::Info, 60_000);
        app.check_and_clear_expired_status();
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_empty_archive() {
        let state = ArchiveState::new(Vec::new(), CredentialStore::in_memory());
        let mut app = App::new(state, AppConfig::default(), Arc::new(FakeSummarizer::default()));
        assert!(app.rows.is_empty());

        app.handle_action(Action::MoveDown);
        app.handle_action(Action::Confirm);
        app.handle_action(Action::Summarize);
        app.handle_action(Action::NextDate);
        assert_eq!(app.selected_idx, 0);
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_failed_reload_keeps_loaded_archive() {
        let (mut app, _) = create_app();
        let tmp = tempfile::TempDir::new().unwrap();
        app.config.timeline_file = tmp.path().join("missing.json");
        app.handle_action(Action::UpdateSearch('h'));
        let rows_before = app.rows.len();

        app.handle_action(Action::Reload);

        assert_eq!(app.state.timeline().len(), 2);
        assert_eq!(app.state.search(), "h");
        assert_eq!(app.rows.len(), rows_before);
        let status = app.status_message.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.contains("No timeline source available"));
    }

    #[test]
    fn test_reload_replaces_timeline() {
        let (mut app, _) = create_app();
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("timeline.json");
        let fresh =
            vec![TimelineDay::new("11/01/2025", vec![Message::text("Dee", "7:00", "new")])];
        crate::parsers::write_timeline_file(&path, &fresh).unwrap();
        app.config.timeline_file = path;

        app.handle_action(Action::Reload);

        assert_eq!(app.state.timeline(), fresh.as_slice());
        assert_eq!(app.rows.len(), 1);
        assert_eq!(app.status_message.as_ref().unwrap().kind, StatusKind::Success);
    }

    #[test]
    fn test_quit_always_wins() {
        let (mut app, _) = create_app();
        app.alert = Some("boom".into());
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }
}
