//! Terminal output sanitization
//!
//! Message text comes straight from chat exports and remote timeline documents.
//! Anything printed by the `search` and `show` commands, or drawn by the TUI,
//! goes through [`sanitize_for_terminal`] first so embedded escape sequences
//! cannot clear the screen, move the cursor or rewrite the window title.

/// Removes ANSI escape sequences and control characters from `text`
///
/// Handles CSI sequences (`ESC [ ... letter`), OSC sequences
/// (`ESC ] ... BEL` or `ESC ] ... ESC \`) and bare two-byte escapes. Tab,
/// newline and carriage return are kept.
///
/// # Examples
///
/// ```
/// use chat_archive_explorer::utils::terminal::sanitize_for_terminal;
///
/// assert_eq!(sanitize_for_terminal("\x1b[31mRed\x1b[0m"), "Red");
/// assert_eq!(sanitize_for_terminal("\x1b]0;title\x07Hi"), "Hi");
/// ```
pub fn sanitize_for_terminal(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    for next_ch in chars.by_ref() {
                        if next_ch.is_ascii_alphabetic() || next_ch == '~' {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(next_ch) = chars.next() {
                        if next_ch == '\x07' {
                            break;
                        }
                        if next_ch == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                Some(_) => {
                    chars.next();
                }
                None => {}
            }
            continue;
        }

        if ch.is_control() && ch != '\t' && ch != '\n' && ch != '\r' {
            continue;
        }

        result.push(ch);
    }

    result
}
