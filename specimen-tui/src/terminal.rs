//! Terminal setup and teardown with panic safety.

use std::io::{self, Stdout, Write};
use std::panic;

use crossterm::{
    cursor, execute, queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::text::{Line, Style};

/// Owns the terminal for the lifetime of the UI and restores it on drop.
pub struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    /// Enters raw mode and the alternate screen.
    pub fn new() -> io::Result<Self> {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = restore_terminal();
            original_hook(panic_info);
        }));

        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

        Ok(Self { stdout })
    }

    /// Terminal size as `(columns, rows)`.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Draws a full frame. Lines beyond the screen are dropped, missing
    /// lines are cleared.
    pub fn draw(&mut self, lines: &[Line]) -> io::Result<()> {
        let (width, height) = terminal::size()?;

        for y in 0..height {
            queue!(
                self.stdout,
                cursor::MoveTo(0, y),
                terminal::Clear(ClearType::CurrentLine)
            )?;
            let Some(line) = lines.get(y as usize) else {
                continue;
            };
            for span in line.clone().fit(width as usize).spans {
                self.apply(span.style)?;
                queue!(self.stdout, Print(span.text), SetAttribute(Attribute::Reset), ResetColor)?;
            }
        }

        self.stdout.flush()
    }

    fn apply(&mut self, style: Style) -> io::Result<()> {
        if let Some(fg) = style.fg {
            queue!(self.stdout, SetForegroundColor(fg))?;
        }
        if let Some(bg) = style.bg {
            queue!(self.stdout, SetBackgroundColor(bg))?;
        }
        if style.bold {
            queue!(self.stdout, SetAttribute(Attribute::Bold))?;
        }
        if style.reverse {
            queue!(self.stdout, SetAttribute(Attribute::Reverse))?;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

fn restore_terminal() -> io::Result<()> {
    terminal::disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)?;
    Ok(())
}
