//! Terminal output for the cooked line editor.
//!
//! `OutputChannel` owns the outbound byte stream: corked batching, SGR
//! encoding of legacy attribute words and serialization of cell runs. The
//! `vt` module holds the handful of escape sequences the redraw code emits.
//! `CrosstermBackend` switches the host terminal in and out of raw mode.

use anyhow::Result;
use crossterm::{
    cursor::Show,
    execute,
    terminal::{SetTitle, disable_raw_mode, enable_raw_mode},
};
use std::io::stdout;

pub mod attributes;
pub mod channel;
pub mod vt;

pub use attributes::{CellAttributes, format_attributes, is_control_character};
pub use channel::{CellInfo, ChannelError, CorkGuard, Endpoints, MemorySink, OutputChannel};
pub use vt::Point;

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
    fn set_title(&mut self, title: &str) -> Result<()>;
}

/// Raw-mode backend. Cooked reads edit in place on the main screen, so no
/// alternate screen is entered.
pub struct CrosstermBackend {
    entered: bool,
}

/// RAII guard ensuring terminal state restoration even if caller early-returns or panics.
pub struct TerminalGuard<'a> {
    backend: &'a mut CrosstermBackend,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { entered: false }
    }

    /// Enter and return a guard that will leave on drop.
    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_>> {
        self.enter()?;
        Ok(TerminalGuard { backend: self })
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            self.entered = true;
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            // A popup may have hidden the cursor.
            execute!(stdout(), Show)?;
            disable_raw_mode()?;
            self.entered = false;
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        execute!(stdout(), SetTitle(title))?;
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl Drop for TerminalGuard<'_> {
    fn drop(&mut self) {
        let _ = self.backend.leave();
    }
}
