//! Terminal backend abstraction and crossterm implementation.
//!
//! The input line runs on the alternate screen in raw mode with the hardware cursor visible
//! (it marks the edit position). `TerminalGuard` restores the terminal on drop, including
//! during unwinding.

use anyhow::Result;
use crossterm::{
    cursor::Show,
    execute,
    terminal::{
        self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode,
        enable_raw_mode,
    },
};
use std::io::stdout;
use tracing::{debug, warn};

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
    fn set_title(&mut self, title: &str) -> Result<()>;
    /// Current size as (columns, rows).
    fn size(&self) -> Result<(u16, u16)>;
}

#[derive(Debug)]
pub struct CrosstermBackend {
    entered: bool,
}

/// RAII guard ensuring terminal state restoration even if caller early-returns or panics.
pub struct TerminalGuard<'a, B: TerminalBackend = CrosstermBackend> {
    backend: &'a mut B,
    active: bool,
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
}

/// Enter `backend` and return a guard that will leave on drop.
pub fn enter_guard<B: TerminalBackend>(backend: &mut B) -> Result<TerminalGuard<'_, B>> {
    backend.enter()?;
    Ok(TerminalGuard {
        backend,
        active: true,
    })
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Show)?;
            self.entered = true;
            debug!(target: "runtime", "terminal_entered");
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            execute!(stdout(), LeaveAlternateScreen, Show)?;
            disable_raw_mode()?;
            self.entered = false;
            debug!(target: "runtime", "terminal_left");
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        execute!(stdout(), SetTitle(title))?;
        Ok(())
    }

    fn size(&self) -> Result<(u16, u16)> {
        Ok(terminal::size()?)
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl<B: TerminalBackend> TerminalGuard<'_, B> {
    pub fn backend(&mut self) -> &mut B {
        self.backend
    }

    /// Leave now and report failures instead of swallowing them in `drop`.
    pub fn release(mut self) -> Result<()> {
        self.active = false;
        self.backend.leave()
    }
}

impl<B: TerminalBackend> Drop for TerminalGuard<'_, B> {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        if let Err(e) = self.backend.leave() {
            warn!(target: "runtime", error = %e, "terminal_restore_failed");
        }
    }
}
