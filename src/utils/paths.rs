use std::borrow::Cow;
use std::env;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Maximum size for a timeline document: 50MB
pub const MAX_TIMELINE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Maximum size for a chat export: 50MB
pub const MAX_EXPORT_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Validates that a file's size is within `max_bytes`
///
/// Takes an open file handle so the size check and the subsequent read see the
/// same file.
///
/// # Errors
///
/// Returns an error if the file metadata cannot be read or the file is larger
/// than `max_bytes`.
pub fn validate_file_size(file: &File, path: &Path, max_bytes: u64) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > max_bytes {
        bail!("File too large: {} ({} bytes, max {} bytes)", path.display(), file_size, max_bytes);
    }

    Ok(())
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use chat_archive_explorer::format_path_with_tilde;
///
/// let path = PathBuf::from("/Users/alice/.config/chat-archive-explorer");
/// // Returns "~/.config/chat-archive-explorer" if HOME=/Users/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
