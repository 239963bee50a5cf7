use std::io::{self, Stdout};
use std::panic;

use anyhow::{Context, Result};
use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

pub type ArchiveTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Raw mode plus alternate screen for the lifetime of the value
///
/// The screen is handed back on [`restore`](Self::restore), on drop, and
/// before a panic message is printed.
pub struct TerminalManager {
    terminal: ArchiveTerminal,
    restored: bool,
}

impl TerminalManager {
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode (is stdout a terminal?)")?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e).context("Failed to enter the alternate screen");
        }
        install_panic_hook();

        let terminal = match Terminal::new(CrosstermBackend::new(io::stdout())) {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = leave_terminal();
                return Err(e).context("Failed to initialise the terminal backend");
            }
        };

        Ok(Self { terminal, restored: false })
    }

    pub fn terminal_mut(&mut self) -> &mut ArchiveTerminal {
        &mut self.terminal
    }

    /// Leave raw mode and the alternate screen; later calls do nothing
    pub fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        leave_terminal().context("Failed to restore the terminal")
    }
}

impl Drop for TerminalManager {
    fn drop(&mut self) {
        if !self.restored {
            let _ = leave_terminal();
        }
    }
}

fn leave_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)
}

/// Restore the screen before the default hook prints, so the panic message is
/// readable instead of lost in the alternate screen
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = leave_terminal();
        previous(info);
    }));
}
