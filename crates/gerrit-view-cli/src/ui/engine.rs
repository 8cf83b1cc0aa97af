//! Terminal Engine - Full-screen painting
//!
//! [`Screen`] switches the terminal into raw mode on the alternate screen
//! and restores it when dropped, so every exit path (including errors)
//! leaves the user's shell intact.

use super::dashboard::Line;
use crossterm::{
    QueueableCommand, cursor, execute,
    style::{Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{Result, Stdout, Write, stdout};

pub struct Screen {
    stdout: Stdout,
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen").finish_non_exhaustive()
    }
}

impl Screen {
    /// Take over the terminal
    pub fn enter() -> Result<Self> {
        let mut stdout = stdout();
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(stdout, EnterAlternateScreen, cursor::Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(Self { stdout })
    }

    /// Current terminal size as (columns, rows)
    pub fn size() -> Result<(u16, u16)> {
        terminal::size()
    }

    /// Paint a full frame. An empty frame (terminal too small) clears the screen.
    pub fn draw(&mut self, lines: &[Line]) -> Result<()> {
        if lines.is_empty() {
            self.stdout.queue(Clear(ClearType::All))?;
        }
        for (row, line) in lines.iter().enumerate() {
            // 1. Jump to the row
            self.stdout.queue(cursor::MoveTo(0, row as u16))?;

            // 2. Render the spans
            for span in line {
                self.stdout.queue(SetForegroundColor(span.color))?;
                self.stdout.queue(Print(&span.text))?;
            }
            self.stdout.queue(ResetColor)?;

            // 3. Clear leftovers from a wider previous frame
            self.stdout.queue(Clear(ClearType::UntilNewLine))?;
        }
        // Single flush per frame
        self.stdout.flush()
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, ResetColor, cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
