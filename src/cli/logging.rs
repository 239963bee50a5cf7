use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::utils::get_cache_dir;

const DEFAULT_FILTER: &str = "chat_archive_explorer=warn";
pub const TUI_LOG_FILENAME: &str = "tui.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Log to stderr, for plain commands
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log to `<cache dir>/chat-archive-explorer/tui.log`, keeping the alternate
/// screen clean. Logging is disabled if the file cannot be opened.
pub fn init_tui() {
    let Ok(dir) = get_cache_dir() else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(dir.join(TUI_LOG_FILENAME))
    else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
