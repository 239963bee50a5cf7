use std::path::PathBuf;

use anyhow::{Context, Result};

/// Directory name used under the platform config and cache directories
pub const APP_DIR_NAME: &str = "chat-archive-explorer";

/// Get the application config directory
/// (`~/.config/chat-archive-explorer` on Linux, `~/Library/Application Support/...` on macOS)
pub fn get_config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Failed to get platform config directory")?;
    Ok(base.join(APP_DIR_NAME))
}

/// Get the application cache directory, used for the TUI log file
pub fn get_cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Failed to get platform cache directory")?;
    Ok(base.join(APP_DIR_NAME))
}
