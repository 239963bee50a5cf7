// TUI module for browsing the archive interactively
mod app;
mod events;
mod layout;
mod rendering;
mod terminal;

use std::sync::Arc;

use anyhow::Result;
pub use app::{App, StatusKind};

use crate::config::AppConfig;
use crate::state::ArchiveState;
use crate::summarize::Summarizer;
use terminal::TerminalManager;

/// Run the interactive TUI until the user quits
///
/// `startup_status`, when given, is shown in the status bar first (e.g. a
/// note that the fallback timeline source was used).
pub fn run_interactive(
    state: ArchiveState,
    config: AppConfig,
    summarizer: Arc<dyn Summarizer>,
    startup_status: Option<(String, StatusKind)>,
) -> Result<()> {
    let mut app = App::new(state, config, summarizer);
    if let Some((text, kind)) = startup_status {
        app = app.with_status(text, kind);
    }

    let mut manager = TerminalManager::new()?;
    let res = app.run(manager.terminal_mut());
    manager.restore()?;

    res
}
